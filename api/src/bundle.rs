//! Composition of zero-value bundles ready for attachment.

use thiserror::Error;

use crate::kerl;
use crate::kerl::Kerl;
use crate::transaction::Transaction;
use crate::transaction::MESSAGE_FRAGMENT_TRYTES;
use crate::trytes;
use crate::trytes::TrytesError;
use crate::trytes::HASH_TRYTES;
use crate::trytes::TAG_TRYTES;

/// A single output of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transfer {
    pub address: String,
    pub value: i64,
    /// Optional tag in trytes, padded to 27 trytes.
    pub tag: String,
    /// Message already encoded as trytes.
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    #[error("a bundle needs at least one transfer")]
    NoTransfers,

    #[error("value transfers are not supported, found value {0}")]
    ValueTransfer(i64),

    #[error("invalid transfer address: {0}")]
    InvalidAddress(String),

    #[error("invalid transfer tag: {0}")]
    InvalidTag(String),

    #[error("invalid message trytes")]
    InvalidMessage,

    #[error(transparent)]
    Trytes(#[from] TrytesError),
}

/// Builds the transactions of a zero-value bundle and returns their trytes,
/// highest index first, the order expected by `attachToTangle`.
///
/// `timestamp` is in seconds since the unix epoch.
pub fn prepare_transfers(transfers: &[Transfer], timestamp: i64) -> Result<Vec<String>, BundleError> {
    let bundle = build_bundle(transfers, timestamp)?;
    Ok(bundle.iter().rev().map(Transaction::to_trytes).collect())
}

/// The finalised bundle in index order.
pub fn build_bundle(transfers: &[Transfer], timestamp: i64) -> Result<Vec<Transaction>, BundleError> {
    if transfers.is_empty() {
        return Err(BundleError::NoTransfers);
    }

    let mut bundle = Vec::new();
    for transfer in transfers {
        if transfer.value != 0 {
            return Err(BundleError::ValueTransfer(transfer.value));
        }
        let address = kerl::strip_checksum(&transfer.address)
            .map_err(|_| BundleError::InvalidAddress(transfer.address.clone()))?;
        if !transfer.tag.is_empty() && !trytes::is_tag(&transfer.tag) {
            return Err(BundleError::InvalidTag(transfer.tag.clone()));
        }
        if !transfer.message.is_empty() && !trytes::is_trytes(&transfer.message) {
            return Err(BundleError::InvalidMessage);
        }
        let tag = trytes::pad_trytes(&transfer.tag, TAG_TRYTES);

        for fragment in message_fragments(&transfer.message) {
            bundle.push(Transaction {
                hash: String::new(),
                signature_message_fragment: fragment,
                address: address.to_string(),
                value: 0,
                obsolete_tag: tag.clone(),
                timestamp,
                current_index: 0,
                last_index: 0,
                bundle: "9".repeat(HASH_TRYTES),
                trunk_transaction: "9".repeat(HASH_TRYTES),
                branch_transaction: "9".repeat(HASH_TRYTES),
                tag: tag.clone(),
                attachment_timestamp: 0,
                attachment_timestamp_lower_bound: 0,
                attachment_timestamp_upper_bound: 0,
                nonce: "9".repeat(TAG_TRYTES),
            });
        }
    }

    let last_index = bundle.len() as i64 - 1;
    for (index, tx) in bundle.iter_mut().enumerate() {
        tx.current_index = index as i64;
        tx.last_index = last_index;
    }

    finalize(&mut bundle)?;
    Ok(bundle)
}

fn message_fragments(message: &str) -> Vec<String> {
    if message.is_empty() {
        return vec![trytes::pad_trytes("", MESSAGE_FRAGMENT_TRYTES)];
    }
    message
        .as_bytes()
        .chunks(MESSAGE_FRAGMENT_TRYTES)
        .map(|chunk| {
            let chunk = String::from_utf8_lossy(chunk);
            trytes::pad_trytes(&chunk, MESSAGE_FRAGMENT_TRYTES)
        })
        .collect()
}

/// Computes the bundle hash, bumping the obsolete tag of the first
/// transaction until the normalized hash is free of `M`.
fn finalize(bundle: &mut [Transaction]) -> Result<(), TrytesError> {
    loop {
        let hash = bundle_hash(bundle)?;
        if !normalized_bundle(&hash)?.contains(&13) {
            for tx in bundle.iter_mut() {
                tx.bundle = hash.clone();
            }
            return Ok(());
        }
        let mut tag_trits = trytes::trytes_to_trits(&bundle[0].obsolete_tag)?;
        trytes::increment_trits(&mut tag_trits);
        bundle[0].obsolete_tag = trytes::trits_to_trytes(&tag_trits)?;
    }
}

fn bundle_hash(bundle: &[Transaction]) -> Result<String, TrytesError> {
    let mut kerl = Kerl::new();
    for tx in bundle {
        let essence = format!(
            "{}{}{}{}{}{}",
            tx.address,
            trytes::value_to_trytes(tx.value, 27),
            tx.obsolete_tag,
            trytes::value_to_trytes(tx.timestamp, 9),
            trytes::value_to_trytes(tx.current_index, 9),
            trytes::value_to_trytes(tx.last_index, 9),
        );
        kerl.absorb(&trytes::trytes_to_trits(&essence)?)?;
    }
    trytes::trits_to_trytes(&kerl.squeeze(1))
}

/// Balances each third of the bundle hash so its tryte values sum to zero.
pub fn normalized_bundle(bundle_hash: &str) -> Result<Vec<i8>, TrytesError> {
    let mut values = bundle_hash
        .chars()
        .map(trytes::tryte_value)
        .collect::<Result<Vec<_>, _>>()?;

    for chunk in values.chunks_mut(HASH_TRYTES / 3) {
        let mut sum: i32 = chunk.iter().map(|v| *v as i32).sum();
        while sum > 0 {
            if let Some(v) = chunk.iter_mut().find(|v| **v > -13) {
                *v -= 1;
                sum -= 1;
            }
        }
        while sum < 0 {
            if let Some(v) = chunk.iter_mut().find(|v| **v < 13) {
                *v += 1;
                sum += 1;
            }
        }
    }
    Ok(values)
}

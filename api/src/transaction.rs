//! Transaction trytes layout and the decoded transaction object.

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::curl;
use crate::trytes;
use crate::trytes::TrytesError;

/// Number of trytes in a serialised transaction.
pub const TRANSACTION_TRYTES: usize = 2673;

/// Number of trytes in the signature/message fragment.
pub const MESSAGE_FRAGMENT_TRYTES: usize = 2187;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction trytes must be 2673 trytes, found {0}")]
    InvalidLength(usize),

    #[error(transparent)]
    Trytes(#[from] TrytesError),
}

/// A transaction as stored on the tangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub signature_message_fragment: String,
    pub address: String,
    pub value: i64,
    pub obsolete_tag: String,
    pub timestamp: i64,
    pub current_index: i64,
    pub last_index: i64,
    pub bundle: String,
    pub trunk_transaction: String,
    pub branch_transaction: String,
    pub tag: String,
    pub attachment_timestamp: i64,
    pub attachment_timestamp_lower_bound: i64,
    pub attachment_timestamp_upper_bound: i64,
    pub nonce: String,
}

/// Field widths in trytes, in serialisation order.
mod layout {
    pub const SIGNATURE: usize = 2187;
    pub const ADDRESS: usize = 81;
    pub const VALUE: usize = 27;
    pub const OBSOLETE_TAG: usize = 27;
    pub const TIMESTAMP: usize = 9;
    pub const CURRENT_INDEX: usize = 9;
    pub const LAST_INDEX: usize = 9;
    pub const BUNDLE: usize = 81;
    pub const TRUNK: usize = 81;
    pub const BRANCH: usize = 81;
    pub const TAG: usize = 27;
    pub const ATTACHMENT_TIMESTAMP: usize = 9;
    pub const LOWER_BOUND: usize = 9;
    pub const UPPER_BOUND: usize = 9;
    pub const NONCE: usize = 27;
}

struct Fields<'a> {
    trytes: &'a str,
    offset: usize,
}

impl<'a> Fields<'a> {
    fn take(&mut self, width: usize) -> &'a str {
        let field = &self.trytes[self.offset..self.offset + width];
        self.offset += width;
        field
    }

    fn take_value(&mut self, width: usize) -> Result<i64, TrytesError> {
        trytes::trytes_to_value(self.take(width))
    }
}

impl Transaction {
    /// Parses transaction trytes and computes the transaction hash.
    pub fn from_trytes(transaction_trytes: &str) -> Result<Self, TransactionError> {
        if transaction_trytes.len() != TRANSACTION_TRYTES {
            return Err(TransactionError::InvalidLength(transaction_trytes.len()));
        }
        if !trytes::is_trytes(transaction_trytes) {
            let bad = transaction_trytes
                .chars()
                .find(|c| trytes::tryte_value(*c).is_err())
                .unwrap_or('?');
            return Err(TrytesError::InvalidCharacter(bad).into());
        }

        let hash = curl::transaction_hash(transaction_trytes)?;
        let mut fields = Fields {
            trytes: transaction_trytes,
            offset: 0,
        };

        Ok(Self {
            hash,
            signature_message_fragment: fields.take(layout::SIGNATURE).to_string(),
            address: fields.take(layout::ADDRESS).to_string(),
            value: fields.take_value(layout::VALUE)?,
            obsolete_tag: fields.take(layout::OBSOLETE_TAG).to_string(),
            timestamp: fields.take_value(layout::TIMESTAMP)?,
            current_index: fields.take_value(layout::CURRENT_INDEX)?,
            last_index: fields.take_value(layout::LAST_INDEX)?,
            bundle: fields.take(layout::BUNDLE).to_string(),
            trunk_transaction: fields.take(layout::TRUNK).to_string(),
            branch_transaction: fields.take(layout::BRANCH).to_string(),
            tag: fields.take(layout::TAG).to_string(),
            attachment_timestamp: fields.take_value(layout::ATTACHMENT_TIMESTAMP)?,
            attachment_timestamp_lower_bound: fields.take_value(layout::LOWER_BOUND)?,
            attachment_timestamp_upper_bound: fields.take_value(layout::UPPER_BOUND)?,
            nonce: fields.take(layout::NONCE).to_string(),
        })
    }

    /// Serialises the transaction. The hash is not part of the trytes.
    pub fn to_trytes(&self) -> String {
        let mut out = String::with_capacity(TRANSACTION_TRYTES);
        out.push_str(&trytes::pad_trytes(
            &self.signature_message_fragment,
            layout::SIGNATURE,
        ));
        out.push_str(&trytes::pad_trytes(&self.address, layout::ADDRESS));
        out.push_str(&trytes::value_to_trytes(self.value, layout::VALUE));
        out.push_str(&trytes::pad_trytes(&self.obsolete_tag, layout::OBSOLETE_TAG));
        out.push_str(&trytes::value_to_trytes(self.timestamp, layout::TIMESTAMP));
        out.push_str(&trytes::value_to_trytes(
            self.current_index,
            layout::CURRENT_INDEX,
        ));
        out.push_str(&trytes::value_to_trytes(self.last_index, layout::LAST_INDEX));
        out.push_str(&trytes::pad_trytes(&self.bundle, layout::BUNDLE));
        out.push_str(&trytes::pad_trytes(&self.trunk_transaction, layout::TRUNK));
        out.push_str(&trytes::pad_trytes(&self.branch_transaction, layout::BRANCH));
        out.push_str(&trytes::pad_trytes(&self.tag, layout::TAG));
        out.push_str(&trytes::value_to_trytes(
            self.attachment_timestamp,
            layout::ATTACHMENT_TIMESTAMP,
        ));
        out.push_str(&trytes::value_to_trytes(
            self.attachment_timestamp_lower_bound,
            layout::LOWER_BOUND,
        ));
        out.push_str(&trytes::value_to_trytes(
            self.attachment_timestamp_upper_bound,
            layout::UPPER_BOUND,
        ));
        out.push_str(&trytes::pad_trytes(&self.nonce, layout::NONCE));
        out
    }

    /// The message carried in the signature fragment, if it decodes as text.
    pub fn message(&self) -> Option<String> {
        trytes::trytes_to_text(&self.signature_message_fragment)
            .filter(|text| !text.is_empty())
    }

    pub fn is_tail(&self) -> bool {
        self.current_index == 0
    }
}

/// Nodes answer unknown hashes with trytes that are all `9`.
pub fn is_empty_trytes(transaction_trytes: &str) -> bool {
    transaction_trytes.bytes().all(|b| b == b'9')
}

//! The ledger's native base-27 alphabet, its balanced-ternary representation,
//! and the validators used for hashes, addresses and tags.

use thiserror::Error;

/// Every tryte character, ordered by value (`9` = 0, `A` = 1 ... `Z` = 26).
pub const TRYTE_ALPHABET: &str = "9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of trytes in a transaction, bundle or address hash.
pub const HASH_TRYTES: usize = 81;

/// Number of trytes in an address carrying its 9-tryte checksum.
pub const ADDRESS_WITH_CHECKSUM_TRYTES: usize = 90;

/// Maximum number of trytes in a tag.
pub const TAG_TRYTES: usize = 27;

pub const TRITS_PER_TRYTE: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrytesError {
    #[error("invalid tryte character '{0}'")]
    InvalidCharacter(char),

    #[error("expected {expected} trytes, found {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("invalid trit value {0}")]
    InvalidTrit(i8),
}

/// Returns true if every character belongs to the tryte alphabet.
///
/// The empty string is not considered trytes.
pub fn is_trytes(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(is_tryte_byte)
}

pub fn is_trytes_of_exact_length(value: &str, length: usize) -> bool {
    value.len() == length && is_trytes(value)
}

pub fn is_trytes_of_max_length(value: &str, length: usize) -> bool {
    value.len() <= length && is_trytes(value)
}

/// An address or transaction hash, with or without the address checksum.
pub fn is_hash(value: &str) -> bool {
    is_trytes_of_exact_length(value, HASH_TRYTES)
        || is_trytes_of_exact_length(value, ADDRESS_WITH_CHECKSUM_TRYTES)
}

pub fn is_tag(value: &str) -> bool {
    is_trytes_of_max_length(value, TAG_TRYTES)
}

fn is_tryte_byte(b: u8) -> bool {
    b == b'9' || b.is_ascii_uppercase()
}

/// The signed value (-13..=13) of a single tryte character.
pub fn tryte_value(c: char) -> Result<i8, TrytesError> {
    match c {
        '9' => Ok(0),
        'A'..='M' => Ok((c as u8 - b'A' + 1) as i8),
        'N'..='Z' => Ok((c as u8 - b'A' + 1) as i8 - 27),
        _ => Err(TrytesError::InvalidCharacter(c)),
    }
}

/// The tryte character for a signed value in -13..=13.
pub fn tryte_char(value: i8) -> char {
    let index = value.rem_euclid(27) as usize;
    TRYTE_ALPHABET.as_bytes()[index] as char
}

pub fn trytes_to_trits(trytes: &str) -> Result<Vec<i8>, TrytesError> {
    let mut trits = Vec::with_capacity(trytes.len() * TRITS_PER_TRYTE);
    for c in trytes.chars() {
        trits.extend(value_to_trits(tryte_value(c)? as i64, TRITS_PER_TRYTE));
    }
    Ok(trits)
}

/// Converts trits to trytes. A trailing partial tryte is padded with zero trits.
pub fn trits_to_trytes(trits: &[i8]) -> Result<String, TrytesError> {
    trits
        .chunks(TRITS_PER_TRYTE)
        .map(|chunk| {
            if let Some(&bad) = chunk.iter().find(|t| !(-1..=1).contains(*t)) {
                return Err(TrytesError::InvalidTrit(bad));
            }
            Ok(tryte_char(trits_to_value(chunk) as i8))
        })
        .collect()
}

/// Balanced-ternary encoding of `value`, least significant trit first,
/// truncated or zero-padded to `length` trits.
pub fn value_to_trits(value: i64, length: usize) -> Vec<i8> {
    let mut trits = Vec::with_capacity(length);
    let mut rest = value;
    while trits.len() < length {
        let mut remainder = (rest % 3) as i8;
        rest /= 3;
        if remainder > 1 {
            remainder -= 3;
            rest += 1;
        } else if remainder < -1 {
            remainder += 3;
            rest -= 1;
        }
        trits.push(remainder);
    }
    trits
}

pub fn trits_to_value(trits: &[i8]) -> i64 {
    trits
        .iter()
        .rev()
        .fold(0i64, |acc, &t| acc.saturating_mul(3).saturating_add(t as i64))
}

/// Fixed-width tryte encoding of an integer field.
pub fn value_to_trytes(value: i64, trytes: usize) -> String {
    let trits = value_to_trits(value, trytes * TRITS_PER_TRYTE);
    trits
        .chunks(TRITS_PER_TRYTE)
        .map(|chunk| tryte_char(trits_to_value(chunk) as i8))
        .collect()
}

pub fn trytes_to_value(trytes: &str) -> Result<i64, TrytesError> {
    Ok(trits_to_value(&trytes_to_trits(trytes)?))
}

/// Right-pads `trytes` with `9` up to `length`.
pub fn pad_trytes(trytes: &str, length: usize) -> String {
    let mut padded = String::with_capacity(length.max(trytes.len()));
    padded.push_str(trytes);
    while padded.len() < length {
        padded.push('9');
    }
    padded
}

/// Encodes text as trytes, two trytes per UTF-8 byte.
pub fn text_to_trytes(text: &str) -> String {
    let alphabet = TRYTE_ALPHABET.as_bytes();
    let mut trytes = String::with_capacity(text.len() * 2);
    for byte in text.bytes() {
        trytes.push(alphabet[(byte % 27) as usize] as char);
        trytes.push(alphabet[(byte / 27) as usize] as char);
    }
    trytes
}

/// Decodes trytes produced by [`text_to_trytes`].
///
/// Decoding stops at the first `99` pair so padded message fragments read
/// back cleanly. Returns `None` when the trytes do not encode UTF-8 text.
pub fn trytes_to_text(trytes: &str) -> Option<String> {
    let bytes = trytes.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks(2) {
        if pair.len() < 2 || pair == b"99" {
            break;
        }
        let low = TRYTE_ALPHABET.find(pair[0] as char)?;
        let high = TRYTE_ALPHABET.find(pair[1] as char)?;
        let value = low + high * 27;
        decoded.push(u8::try_from(value).ok()?);
    }
    String::from_utf8(decoded).ok()
}

/// Adds one to a balanced-ternary number in place, wrapping on overflow.
pub fn increment_trits(trits: &mut [i8]) {
    for trit in trits.iter_mut() {
        *trit += 1;
        if *trit > 1 {
            *trit = -1;
        } else {
            break;
        }
    }
}

//! Hash and form validation for the explorer views.

use api::hash_kind::HashKind;
use api::trytes;
use api::trytes::HASH_TRYTES;
use api::trytes::TAG_TRYTES;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("You must fill in the hash.")]
    EmptyHash,

    #[error("The address hash must contain A-Z or 9 and be 81 or 90 trytes in length.")]
    InvalidAddress,

    #[error("The {0} hash must contain A-Z or 9 and be 81 trytes in length.")]
    InvalidHash(HashKind),

    #[error("The tag hash must contain A-Z or 9 and be a maximum 27 trytes in length.")]
    InvalidTag,

    #[error("The address hash must contain A-Z or 9 and be 81 or 90 trytes in length, it is length {0}")]
    InvalidAddressLength(usize),

    #[error("The tag hash must contain A-Z or 9 and be a maximum 27 trytes in length, it is length {0}")]
    InvalidTagLength(usize),
}

/// Checks `hash` against the rule for `kind`.
pub fn validate(hash: &str, kind: HashKind) -> Result<(), ValidationError> {
    if hash.is_empty() {
        return Err(ValidationError::EmptyHash);
    }
    match kind {
        HashKind::Address if !trytes::is_hash(hash) => Err(ValidationError::InvalidAddress),
        HashKind::Transaction | HashKind::Bundle
            if !trytes::is_trytes_of_exact_length(hash, HASH_TRYTES) =>
        {
            Err(ValidationError::InvalidHash(kind))
        }
        HashKind::Tag if !trytes::is_tag(hash) => Err(ValidationError::InvalidTag),
        _ => Ok(()),
    }
}

/// The address field of the simple transaction form. Lower case input is
/// accepted and upper cased before checking.
pub fn validate_address_field(address: &str) -> Result<(), ValidationError> {
    if trytes::is_hash(&address.to_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidAddressLength(address.len()))
    }
}

/// The optional tag field of the simple transaction form.
pub fn validate_tag_field(tag: &str) -> Result<(), ValidationError> {
    if tag.is_empty() || trytes::is_trytes_of_max_length(&tag.to_uppercase(), TAG_TRYTES) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTagLength(tag.len()))
    }
}

//! The kinds of hash the explorer can look up.

use serde::Deserialize;
use serde::Serialize;

/// Determines both the validation rule for a hash and the shape of the
/// query issued for it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumIs,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HashKind {
    #[default]
    Transaction,
    Address,
    Tag,
    Bundle,
}

impl HashKind {
    /// Heading shown above results of this kind.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Transaction => "Transaction",
            Self::Address => "Address",
            Self::Tag => "Tag",
            Self::Bundle => "Bundle",
        }
    }

    /// The `findTransactions` request field for kinds that resolve to a list.
    pub fn find_field(&self) -> Option<&'static str> {
        match self {
            Self::Transaction => None,
            Self::Address => Some("addresses"),
            Self::Tag => Some("tags"),
            Self::Bundle => Some("bundles"),
        }
    }
}

//! The tangle networks the explorer can talk to.

use serde::Deserialize;
use serde::Serialize;

/// A tangle network. Routes and settings are keyed by it.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Network {
    #[default]
    Mainnet,
    Devnet,
}

impl Network {
    /// Parses an optional route segment. Anything other than a known
    /// network name selects mainnet.
    pub fn from_route(segment: Option<&str>) -> Self {
        segment
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// The display label used by the network selector.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mainnet => "MainNet",
            Self::Devnet => "DevNet",
        }
    }

    /// The suffix appended to links that stay on this network.
    /// Mainnet links carry no suffix.
    pub fn route_suffix(&self) -> String {
        match self {
            Self::Mainnet => String::new(),
            other => format!("/{}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_segment_defaults_to_mainnet() {
        assert_eq!(Network::from_route(None), Network::Mainnet);
        assert_eq!(Network::from_route(Some("devnet")), Network::Devnet);
        assert_eq!(Network::from_route(Some("DevNet")), Network::Devnet);
        assert_eq!(Network::from_route(Some("testnet")), Network::Mainnet);
    }

    #[test]
    fn suffix_only_for_non_default() {
        assert_eq!(Network::Mainnet.route_suffix(), "");
        assert_eq!(Network::Devnet.route_suffix(), "/devnet");
        assert_eq!(Network::Devnet.to_string(), "devnet");
    }
}

//! Route parameters of the explore view and the links between views.

use api::hash_kind::HashKind;
use api::network::Network;

use crate::Route;

/// The `{hash, kind, network}` a view was opened with.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RouteParams {
    pub hash: String,
    pub hash_kind: HashKind,
    pub network: Network,
}

impl RouteParams {
    /// `network` is the optional trailing route segment; anything other than
    /// a known network selects mainnet.
    pub fn new(hash_kind: HashKind, hash: impl Into<String>, network: Option<&str>) -> Self {
        Self {
            hash: hash.into(),
            hash_kind,
            network: Network::from_route(network),
        }
    }

    /// The route that opens these parameters. Mainnet routes carry no
    /// network segment.
    pub fn to_route(&self) -> Route {
        match self.network {
            Network::Mainnet => Route::Explore {
                kind: self.hash_kind,
                hash: self.hash.clone(),
            },
            network => Route::ExploreOnNetwork {
                kind: self.hash_kind,
                hash: self.hash.clone(),
                network: network.to_string(),
            },
        }
    }
}

/// Link to a single transaction on `network`.
pub fn transaction_route(hash: &str, network: Network) -> Route {
    RouteParams {
        hash: hash.to_string(),
        hash_kind: HashKind::Transaction,
        network,
    }
    .to_route()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_segment_is_optional() {
        let params = RouteParams::new(HashKind::Bundle, "ABC", None);
        assert_eq!(params.network, Network::Mainnet);
        assert_eq!(
            params.to_route(),
            Route::Explore {
                kind: HashKind::Bundle,
                hash: "ABC".to_string()
            }
        );

        let params = RouteParams::new(HashKind::Tag, "TAG", Some("devnet"));
        assert_eq!(
            params.to_route(),
            Route::ExploreOnNetwork {
                kind: HashKind::Tag,
                hash: "TAG".to_string(),
                network: "devnet".to_string()
            }
        );
    }

    #[test]
    fn transaction_links_render_paths() {
        let hash = "A".repeat(81);
        assert_eq!(
            transaction_route(&hash, Network::Mainnet).to_string(),
            format!("/transaction/{hash}")
        );
        assert_eq!(
            transaction_route(&hash, Network::Devnet).to_string(),
            format!("/transaction/{hash}/devnet")
        );
    }

    #[test]
    fn paths_parse_back_into_routes() {
        use std::str::FromStr;

        assert_eq!(Route::from_str("/").ok(), Some(Route::Search {}));
        assert_eq!(
            Route::from_str("/simple-transaction").ok(),
            Some(Route::SimpleTransaction {})
        );
        assert_eq!(
            Route::from_str("/address/ABC/devnet").ok(),
            Some(Route::ExploreOnNetwork {
                kind: HashKind::Address,
                hash: "ABC".to_string(),
                network: "devnet".to_string()
            })
        );
    }
}

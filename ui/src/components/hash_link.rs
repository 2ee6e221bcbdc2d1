use api::hash_kind::HashKind;
use api::network::Network;
use dioxus::prelude::*;

use crate::route::RouteParams;

/// Navigates to the explore view for `hash`, staying on `network`.
#[component]
pub fn HashLink(hash: String, kind: HashKind, network: Network) -> Element {
    if hash.chars().all(|c| c == '9') {
        // Null hashes have nothing to link to.
        return rsx! { code { "{hash}" } };
    }

    let to = RouteParams {
        hash: hash.clone(),
        hash_kind: kind,
        network,
    }
    .to_route();

    rsx! {
        Link {
            to,
            class: "hash-link",
            "{hash}"
        }
    }
}

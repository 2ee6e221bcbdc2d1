use api::hash_kind::HashKind;
use api::network::Network;
use dioxus::prelude::*;
use strum::IntoEnumIterator;

use crate::components::pico::Button;
use crate::components::pico::Card;
use crate::components::pico::Grid;
use crate::components::pico::Input;
use crate::route::RouteParams;
use crate::validation;

/// The entry form: a hash, what kind of hash it is, and the network to look on.
#[component]
pub fn SearchScreen() -> Element {
    let mut hash = use_signal(String::new);
    let mut hash_kind = use_signal(HashKind::default);
    let mut network = use_signal(Network::default);
    let navigator = use_navigator();

    let error = use_memo(move || {
        let hash = hash.read();
        if hash.is_empty() {
            return None;
        }
        validation::validate(&hash.to_uppercase(), hash_kind())
            .err()
            .map(|e| e.to_string())
    });
    let can_search = !hash.read().is_empty() && error.read().is_none();

    let search = move || {
        if !can_search {
            return;
        }
        let params = RouteParams {
            hash: hash.read().to_uppercase(),
            hash_kind: hash_kind(),
            network: network(),
        };
        navigator.push(params.to_route());
    };

    rsx! {
        Card {
            h3 { "Explore the Tangle" }
            form {
                onsubmit: move |evt| {
                    evt.prevent_default();
                    search();
                },
                Input {
                    label: "Hash".to_string(),
                    name: "hash".to_string(),
                    value: hash(),
                    placeholder: "Enter a transaction, address, tag or bundle hash".to_string(),
                    invalid: error.read().is_some(),
                    on_input: move |evt: FormEvent| hash.set(evt.value().trim().to_string()),
                }
                if let Some(message) = error() {
                    small { "{message}" }
                }
                Grid {
                    label {
                        "Kind"
                        select {
                            onchange: move |evt| {
                                if let Ok(kind) = evt.value().parse::<HashKind>() {
                                    hash_kind.set(kind);
                                }
                            },
                            for kind in HashKind::iter() {
                                option {
                                    value: "{kind}",
                                    selected: kind == hash_kind(),
                                    "{kind.title()}"
                                }
                            }
                        }
                    }
                    label {
                        "Network"
                        select {
                            onchange: move |evt| {
                                network.set(Network::from_route(Some(&evt.value())));
                            },
                            for net in Network::iter() {
                                option {
                                    value: "{net}",
                                    selected: net == network(),
                                    "{net.label()}"
                                }
                            }
                        }
                    }
                }
                Button {
                    disabled: !can_search,
                    on_click: move |_| search(),
                    "Search"
                }
            }
        }
    }
}

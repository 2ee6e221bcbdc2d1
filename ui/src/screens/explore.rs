use api::hash_kind::HashKind;
use api::network::Network;
use api::units;
use dioxus::prelude::*;
use dioxus_logger::tracing;

use crate::app_state::AppState;
use crate::components::form_status::FormStatus;
use crate::components::hash_display::HashDisplay;
use crate::components::hash_link::HashLink;
use crate::components::pico::Card;
use crate::components::pico::Grid;
use crate::components::transaction_details::TransactionDetails;
use crate::hooks::use_view_scope::use_view_scope;
use crate::route::RouteParams;
use crate::state::explore;
use crate::state::explore::ExploreState;
use crate::state::explore::Mount;
use crate::state::explore::QueryResult;
use crate::Route;

/// `/:kind/:hash`, always on mainnet.
#[component]
pub fn ExploreScreen(kind: HashKind, hash: String) -> Element {
    let params = RouteParams::new(kind, hash, None);
    let key = format!("{}/{}", kind, params.hash);
    rsx! { ExploreView { key: "{key}", params } }
}

/// `/:kind/:hash/:network`.
#[component]
pub fn ExploreNetworkScreen(kind: HashKind, hash: String, network: String) -> Element {
    let params = RouteParams::new(kind, hash, Some(&network));
    let key = format!("{}/{}/{}", kind, params.hash, params.network);
    rsx! { ExploreView { key: "{key}", params } }
}

#[component]
fn ExploreView(params: RouteParams) -> Element {
    let app_state = use_context::<AppState>();
    let navigator = use_navigator();
    let scope = use_view_scope();

    let mount = use_hook(|| ExploreState::mount(&params));
    let mut state = use_signal(|| match &mount {
        Mount::Ready(initial) => initial.clone(),
        Mount::Redirect => ExploreState::default(),
    });

    use_hook(move || match mount {
        Mount::Redirect => {
            navigator.replace(Route::Search {});
        }
        Mount::Ready(initial) => {
            tracing::info!("exploring {} {} on {}", initial.hash_kind, initial.hash, initial.network);
            let max_listed = app_state.max_listed_hashes();
            spawn(async move {
                let settled = explore::load(&app_state.tangle, &scope, max_listed, initial, |next| {
                    state.set(next.clone())
                })
                .await;
                if settled.is_none() {
                    tracing::warn!("explore view closed before its query settled");
                }
            });
        }
    });

    let current = state.read();
    let title = current.hash_kind.title();
    let network = current.network;

    rsx! {
        Card {
            h3 { "{title}" }
            if current.hash_kind.is_address() {
                HashDisplay { hash: current.hash.clone(), checksum: current.checksum.clone() }
            } else if !current.hash_kind.is_transaction() {
                HashDisplay { hash: current.hash.clone() }
            }
            if !current.validation_message.is_empty() {
                FormStatus {
                    message: current.validation_message.clone(),
                    is_busy: false,
                    is_error: true,
                }
            } else {
                FormStatus {
                    message: current.status.clone(),
                    is_busy: current.is_busy,
                    is_error: current.is_errored,
                }
            }
            match current.result.clone() {
                Some(QueryResult::SingleTransaction { payload }) => rsx! {
                    TransactionDetails { transaction: payload, network }
                },
                Some(QueryResult::HashList { ids, balance, .. }) => rsx! {
                    HashListPanel {
                        ids,
                        balance,
                        count: current.count_label().unwrap_or_default(),
                        network,
                    }
                },
                _ => rsx! {},
            }
        }
    }
}

/// The transactions found for an address, tag or bundle.
#[component]
fn HashListPanel(ids: Vec<String>, balance: Option<u64>, count: String, network: Network) -> Element {
    rsx! {
        Grid {
            if let Some(balance) = balance {
                div {
                    strong { "Balance" }
                    p { "{units::format_best(balance)}" }
                }
            }
            div {
                strong { "Number of Transactions" }
                p { "{count}" }
            }
        }
        div {
            style: "overflow-y: auto; min-height: 0;",
            table {
                tbody {
                    for id in ids {
                        tr {
                            key: "{id}",
                            td {
                                HashLink { hash: id.clone(), kind: HashKind::Transaction, network }
                            }
                        }
                    }
                }
            }
        }
    }
}

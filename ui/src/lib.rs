// The client-side Dioxus application logic.

use api::config::AppConfig;
use api::hash_kind::HashKind;
use dioxus::prelude::*;
use dioxus_logger::tracing;

mod app_state;
pub mod compat;
mod components;
pub mod hooks;
pub mod route;
mod screens;
pub mod state;
pub mod validation;

use app_state::AppState;
use components::pico::Container;
use screens::explore::ExploreNetworkScreen;
use screens::explore::ExploreScreen;
use screens::search::SearchScreen;
use screens::simple_transaction::SimpleTransactionScreen;

/// The application's routes. Static routes are matched before the
/// `/:kind/:hash` patterns.
#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", SearchScreen)]
        Search {},
        #[route("/simple-transaction", SimpleTransactionScreen)]
        SimpleTransaction {},
        #[route("/:kind/:hash", ExploreScreen)]
        Explore { kind: HashKind, hash: String },
        #[route("/:kind/:hash/:network", ExploreNetworkScreen)]
        ExploreOnNetwork { kind: HashKind, hash: String, network: String },
    #[end_layout]
    #[route("/:..segments", NotFound)]
    PageNotFound { segments: Vec<String> },
}

impl Route {
    /// Tabs shown in the header.
    const TABS: [(Route, &'static str); 2] = [
        (Route::Search {}, "Search"),
        (Route::SimpleTransaction {}, "Simple Transaction"),
    ];
}

/// The navigation tabs. Explore pages highlight the search tab.
#[component]
fn Tabs() -> Element {
    let current = use_route::<Route>();
    let active = match current {
        Route::SimpleTransaction {} => Route::SimpleTransaction {},
        _ => Route::Search {},
    };

    rsx! {
        nav {
            class: "tab-menu",
            ul {
                for (route, name) in Route::TABS {
                    li {
                        Link {
                            to: route.clone(),
                            class: if route == active { "active-tab" } else { "" },
                            "{name}"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Layout() -> Element {
    rsx! {
        div {
            class: "app-main-container",
            Container {
                header {
                    nav {
                        ul {
                            li {
                                strong { "Tangle Explorer" }
                            }
                        }
                        ul {
                            li { Tabs {} }
                        }
                    }
                }
                div {
                    class: "content",
                    Outlet::<Route> {}
                }
            }
        }
    }
}

/// Unknown paths go back to search.
#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let navigator = use_navigator();
    use_hook(move || {
        tracing::warn!("no route for /{}", segments.join("/"));
        navigator.replace(Route::Search {});
    });
    rsx! {}
}

//=============================================================================
// MAIN APPLICATION COMPONENT (Client-side)
//=============================================================================

#[allow(non_snake_case)]
pub fn App() -> Element {
    let responsive_css = r#"
    * { box-sizing: border-box; }

    .app-main-container header {
        padding: 0 1rem;
        --pico-nav-element-spacing-vertical: 0.5rem;
    }

    .tab-menu a.active-tab {
        color: var(--pico-primary) !important;
        border-bottom: 3px solid var(--pico-primary);
        text-decoration: none;
    }

    .tab-menu a:not(.active-tab) {
        color: var(--pico-muted-color);
        border-bottom: 3px solid transparent;
    }

    .app-main-container .content {
        padding: 0 1rem;
    }

    a.hash-link, .app-main-container code {
        word-break: break-all;
        font-family: var(--pico-font-family-monospace);
    }
"#;

    rsx! {
        document::Meta {
            name: "viewport",
            content: "width=device-width, initial-scale=1.0",
        }
        document::Stylesheet {
            href: "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.cyan.min.css",
        }
        style {
            "{responsive_css}"
        }
        AppBody {}
    }
}

#[component]
fn AppBody() -> Element {
    let app_state = use_hook(|| {
        AppConfig::load()
            .map_err(anyhow::Error::from)
            .and_then(AppState::new)
            .map_err(|e| {
                tracing::error!("failed to start: {:#}", e);
                e.to_string()
            })
    });

    match app_state {
        Ok(app_state) => rsx! {
            LoadedApp { app_state }
        },
        Err(e) => rsx! {
            p {
                "An error occurred: {e}"
            }
        },
    }
}

/// Provides the shared state and hands over to the router.
#[component]
fn LoadedApp(app_state: AppState) -> Element {
    use_context_provider(|| app_state.clone());

    rsx! {
        Router::<Route> {}
    }
}

use api::network::Network;
use dioxus::prelude::*;
use strum::IntoEnumIterator;

use crate::app_state::AppState;
use crate::components::form_status::FormStatus;
use crate::components::pico::Button;
use crate::components::pico::Card;
use crate::components::pico::Input;
use crate::components::pico::TextArea;
use crate::hooks::use_view_scope::use_view_scope;
use crate::route::transaction_route;
use crate::state::simple_transaction::run_submission;
use crate::state::simple_transaction::SimpleTransactionState;
use crate::state::simple_transaction::SubmitEvent;

/// Attaches a zero-value transaction carrying a message and tag.
#[component]
pub fn SimpleTransactionScreen() -> Element {
    let app_state = use_context::<AppState>();
    let scope = use_view_scope();
    let mut state = use_signal(|| SimpleTransactionState::new(Network::default()));

    let mut dispatch = move |event: SubmitEvent| {
        let next = state.peek().clone().apply(event);
        state.set(next);
    };

    let current = state.read();
    let can_submit = current.can_submit();
    let network = current.network;

    rsx! {
        Card {
            h3 { "Simple Transaction" }
            p {
                "Attach a zero-value transaction to the tangle with a message and an optional tag."
            }
            Input {
                label: "Address".to_string(),
                name: "address".to_string(),
                value: current.address.clone(),
                placeholder: "81 or 90 trytes".to_string(),
                max_length: 90,
                disabled: current.is_busy,
                invalid: !current.address_validation.is_empty(),
                on_input: move |evt: FormEvent| dispatch(SubmitEvent::AddressChanged(evt.value())),
            }
            if !current.address_validation.is_empty() {
                small { "{current.address_validation}" }
            }
            TextArea {
                label: "Message".to_string(),
                name: "message".to_string(),
                value: current.message.clone(),
                rows: 4,
                disabled: current.is_busy,
                on_input: move |evt: FormEvent| dispatch(SubmitEvent::MessageChanged(evt.value())),
            }
            Input {
                label: "Tag".to_string(),
                name: "tag".to_string(),
                value: current.tag.clone(),
                max_length: 27,
                disabled: current.is_busy,
                invalid: !current.tag_validation.is_empty(),
                on_input: move |evt: FormEvent| dispatch(SubmitEvent::TagChanged(evt.value())),
            }
            if !current.tag_validation.is_empty() {
                small { "{current.tag_validation}" }
            }
            label {
                "Network"
                select {
                    disabled: current.is_busy,
                    onchange: move |evt| {
                        dispatch(SubmitEvent::NetworkChanged(Network::from_route(Some(&evt.value()))));
                    },
                    for net in Network::iter() {
                        option {
                            value: "{net}",
                            selected: net == network,
                            "{net.label()}"
                        }
                    }
                }
            }
            Button {
                disabled: !can_submit,
                on_click: move |_| {
                    let app_state = app_state.clone();
                    let scope = scope.clone();
                    let form = state.peek().clone();
                    spawn(async move {
                        run_submission(&app_state, &scope, form, |next| state.set(next.clone())).await;
                    });
                },
                "Attach Message"
            }
            FormStatus {
                message: current.status.clone(),
                is_busy: current.is_busy,
                is_error: current.is_errored,
            }
            if !current.transaction_hash.is_empty() {
                p { "The transaction was successfully created." }
                Link {
                    to: transaction_route(&current.transaction_hash, network),
                    class: "hash-link",
                    "{current.transaction_hash}"
                }
            }
        }
    }
}

use api::hash_kind::HashKind;
use api::kerl;
use api::network::Network;
use api::transaction::Transaction;
use api::units;
use chrono::DateTime;
use dioxus::prelude::*;

use crate::components::hash_display::HashDisplay;
use crate::components::hash_link::HashLink;

fn format_timestamp(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

fn format_value(value: i64) -> String {
    let formatted = units::format_best(value.unsigned_abs());
    if value < 0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// A labelled row in the details grid.
#[component]
fn Field(label: String, children: Element) -> Element {
    rsx! {
        div {
            strong { "{label}" }
            div { style: "margin-bottom: 1rem;", {children} }
        }
    }
}

/// Every field of a decoded transaction, with links to related hashes.
#[component]
pub fn TransactionDetails(transaction: Transaction, network: Network) -> Element {
    let tx = transaction;
    let address = kerl::add_checksum(&tx.address).unwrap_or_else(|_| tx.address.clone());
    let message = tx.message();
    // Attachment timestamps are in milliseconds.
    let attached = format_timestamp(tx.attachment_timestamp / 1000);

    rsx! {
        HashDisplay { hash: tx.hash.clone() }

        hr {}

        div {
            style: "display: grid; grid-template-columns: 1fr 1fr; gap: 0 1rem;",
            Field { label: "Value".to_string(), p { "{format_value(tx.value)}" } }
            Field { label: "Timestamp".to_string(), p { "{format_timestamp(tx.timestamp)}" } }
            Field { label: "Index".to_string(), p { "{tx.current_index} / {tx.last_index}" } }
            Field { label: "Attached".to_string(), p { "{attached}" } }
        }

        Field {
            label: "Address".to_string(),
            HashLink { hash: address, kind: HashKind::Address, network }
        }
        Field {
            label: "Bundle".to_string(),
            HashLink { hash: tx.bundle.clone(), kind: HashKind::Bundle, network }
        }
        Field {
            label: "Tag".to_string(),
            HashLink { hash: tx.tag.trim_end_matches('9').to_string(), kind: HashKind::Tag, network }
        }
        Field {
            label: "Obsolete Tag".to_string(),
            code { "{tx.obsolete_tag}" }
        }
        Field {
            label: "Trunk".to_string(),
            HashLink { hash: tx.trunk_transaction.clone(), kind: HashKind::Transaction, network }
        }
        Field {
            label: "Branch".to_string(),
            HashLink { hash: tx.branch_transaction.clone(), kind: HashKind::Transaction, network }
        }
        Field {
            label: "Nonce".to_string(),
            code { "{tx.nonce}" }
        }

        details {
            summary { "Message" }
            match message {
                Some(text) => rsx! { pre { style: "white-space: pre-wrap;", "{text}" } },
                None => rsx! { code { style: "word-break: break-all;", "{tx.signature_message_fragment}" } },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_keep_their_sign() {
        assert_eq!(format_value(-1_500), "-1.50 Ki");
        assert_eq!(format_value(12), "12 i");
    }

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
    }
}

use dioxus::prelude::*;

use crate::components::pico::CopyButton;

/// A full hash with its optional checksum shown dimmed, and a copy button
/// that copies both.
#[component]
pub fn HashDisplay(hash: String, #[props(default)] checksum: String) -> Element {
    let full = format!("{hash}{checksum}");

    rsx! {
        div {
            style: "display: flex; align-items: center; gap: 0.5rem; flex-wrap: wrap;",
            code {
                style: "word-break: break-all;",
                "{hash}"
                if !checksum.is_empty() {
                    span { style: "opacity: 0.6;", "{checksum}" }
                }
            }
            CopyButton { text_to_copy: full }
        }
    }
}

use dioxus::prelude::*;

/// The status line under a form: a busy indicator while work is pending,
/// error styling when the last attempt failed.
#[component]
pub fn FormStatus(message: String, is_busy: bool, is_error: bool) -> Element {
    if message.is_empty() && !is_busy {
        return rsx! {};
    }

    let color = if is_error {
        "var(--pico-del-color)"
    } else {
        "var(--pico-muted-color)"
    };

    rsx! {
        div {
            class: "form-status",
            role: if is_error { "alert" } else { "status" },
            if is_busy {
                progress {}
            }
            p {
                style: "white-space: pre-wrap; color: {color};",
                "{message}"
            }
        }
    }
}

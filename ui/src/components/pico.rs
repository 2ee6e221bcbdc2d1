//! A set of reusable, lifetime-free Dioxus components for the Pico.css framework.
//! To use, ensure you have pico.min.css linked in your main application.

#![allow(non_snake_case)] // Allow PascalCase for component function names

use dioxus::prelude::*;

use crate::compat;

//=============================================================================
// Layout Components
//=============================================================================

/// A centered container for your content.
/// Wraps content in a `<main class="container">` element.
#[component]
pub fn Container(children: Element) -> Element {
    rsx! { main { class: "container", {children} } }
}

/// A responsive grid layout.
#[component]
pub fn Grid(children: Element) -> Element {
    rsx! { div { class: "grid", {children} } }
}

//=============================================================================
// Content Components
//=============================================================================

/// A card for grouping related content.
/// Wraps content in an `<article>` element.
#[component]
pub fn Card(children: Element) -> Element {
    rsx! { article { {children} } }
}

//=============================================================================
// Interactive Components
//=============================================================================

#[derive(Props, PartialEq, Clone)]
pub struct ButtonProps {
    children: Element,
    #[props(optional)]
    on_click: Option<EventHandler<MouseEvent>>,
    #[props(default = false)]
    disabled: bool,
}

/// A versatile button component.
pub fn Button(props: ButtonProps) -> Element {
    rsx! {
        button {
            r#type: "button",
            disabled: props.disabled,
            onclick: move |evt| {
                if let Some(handler) = &props.on_click {
                    handler.call(evt);
                }
            },
            {props.children}
        }
    }
}

#[derive(Props, PartialEq, Clone)]
pub struct InputProps {
    label: String,
    name: String,
    value: String,
    #[props(default = "text".to_string())]
    input_type: String,
    #[props(optional)]
    placeholder: Option<String>,
    #[props(optional)]
    max_length: Option<usize>,
    #[props(default = false)]
    disabled: bool,
    /// Marks the field invalid when set.
    #[props(optional)]
    invalid: Option<bool>,
    #[props(optional)]
    on_input: Option<EventHandler<FormEvent>>,
}

/// A labeled form input field.
pub fn Input(props: InputProps) -> Element {
    rsx! {
        label {
            "{props.label}",
            input {
                r#type: "{props.input_type}",
                name: "{props.name}",
                value: "{props.value}",
                placeholder: "{props.placeholder.as_deref().unwrap_or(\"\")}",
                maxlength: props.max_length.map(|m| m.to_string()),
                disabled: props.disabled,
                "aria-invalid": props.invalid.map(|i| i.to_string()),
                oninput: move |evt| {
                    if let Some(handler) = &props.on_input {
                        handler.call(evt);
                    }
                },
            }
        }
    }
}

#[derive(Props, PartialEq, Clone)]
pub struct TextAreaProps {
    label: String,
    name: String,
    value: String,
    #[props(default = 10)]
    rows: u32,
    #[props(optional)]
    placeholder: Option<String>,
    #[props(default = false)]
    disabled: bool,
    #[props(optional)]
    on_input: Option<EventHandler<FormEvent>>,
}

pub fn TextArea(props: TextAreaProps) -> Element {
    rsx! {
        label {
            "{props.label}",
            textarea {
                name: "{props.name}",
                rows: "{props.rows}",
                value: "{props.value}",
                placeholder: "{props.placeholder.as_deref().unwrap_or(\"\")}",
                disabled: props.disabled,
                oninput: move |evt| {
                    if let Some(handler) = &props.on_input {
                        handler.call(evt);
                    }
                },
            }
        }
    }
}

/// Copies `text_to_copy` to the clipboard and briefly confirms it.
#[component]
pub fn CopyButton(text_to_copy: String) -> Element {
    let mut copied = use_signal(|| false);

    rsx! {
        button {
            class: "secondary outline",
            r#type: "button",
            style: "padding: 0.25rem 0.75rem; font-size: 0.8rem; margin: 0;",
            onclick: move |_| {
                let text = text_to_copy.clone();
                spawn(async move {
                    let ok = compat::clipboard_set(text).await;
                    copied.set(ok);
                });
            },
            if copied() { "Copied" } else { "Copy" }
        }
    }
}

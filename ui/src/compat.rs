// Platform specific helpers, re-exported from the module for the target.
#[cfg(target_arch = "wasm32")]
pub use wasm32::*;

#[cfg(not(target_arch = "wasm32"))]
pub use non_wasm32::*;

#[cfg(target_arch = "wasm32")]
pub mod wasm32 {
    use wasm_bindgen_futures::JsFuture;
    use web_sys::Window;

    pub async fn clipboard_set(text: String) -> bool {
        match web_sys::window().map(|win: Window| win.navigator().clipboard()) {
            Some(clipboard) => {
                let promise = clipboard.write_text(&text);
                JsFuture::from(promise).await.is_ok()
            }
            _ => false,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod non_wasm32 {
    use dioxus_clipboard::prelude::*;

    pub async fn clipboard_set(text: String) -> bool {
        let mut clipboard = use_clipboard();
        clipboard.set(text).is_ok()
    }
}

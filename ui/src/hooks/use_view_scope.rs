use dioxus::prelude::*;

use crate::state::scope::ViewScope;

/// A [`ViewScope`] that lives as long as the calling component and is torn
/// down when the component is dropped.
pub fn use_view_scope() -> ViewScope {
    let scope = use_hook(ViewScope::new);

    let on_drop = scope.clone();
    use_drop(move || on_drop.tear_down());

    scope
}

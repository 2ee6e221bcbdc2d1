//! Shared components used by the screens.
pub mod form_status;
pub mod hash_display;
pub mod hash_link;
pub mod pico;
pub mod transaction_details;

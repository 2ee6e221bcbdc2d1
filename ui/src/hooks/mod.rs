pub mod use_view_scope;

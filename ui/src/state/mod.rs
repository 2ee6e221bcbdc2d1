//! View state machines, independent of rendering.

pub mod explore;
pub mod scope;
pub mod simple_transaction;

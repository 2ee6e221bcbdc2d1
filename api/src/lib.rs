//! Tangle access shared by every platform the explorer runs on.
//!
//! The tryte and hashing toolkit, transaction decoding, bundle composition,
//! the load balanced node client and the cache in front of it.

pub mod bundle;
pub mod config;
pub mod curl;
pub mod hash_kind;
pub mod kerl;
pub mod network;
pub mod node_client;
pub mod pow;
pub mod tangle;
pub mod tangle_cache;
pub mod transaction;
pub mod trytes;
pub mod units;

pub type ApiError = anyhow::Error;

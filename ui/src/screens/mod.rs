pub mod explore;
pub mod search;
pub mod simple_transaction;

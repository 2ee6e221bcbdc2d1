//! Seams between the screens and the tangle.

use crate::bundle::Transfer;
use crate::hash_kind::HashKind;
use crate::network::Network;
use crate::transaction::Transaction;
use crate::ApiError;

/// Read access to the tangle of any configured network.
#[allow(async_fn_in_trait)]
pub trait TangleQuery {
    /// Fetches full transaction objects. Hashes the node does not know are
    /// left out of the result.
    async fn get_transactions(&self, hashes: &[String], network: Network) -> Result<Vec<Transaction>, ApiError>;

    /// Lists the hashes of transactions matching an address, tag or bundle.
    async fn find_transaction_hashes(&self, kind: HashKind, hash: &str, network: Network) -> Result<Vec<String>, ApiError>;

    /// Confirmed balance of an address, without checksum.
    async fn get_address_balance(&self, address: &str, network: Network) -> Result<u64, ApiError>;
}

/// Composition and submission of bundles on a single network.
#[allow(async_fn_in_trait)]
pub trait TangleSubmit {
    /// Builds the bundle trytes for `transfers`, highest index first.
    async fn prepare_transfers(&self, seed: &str, transfers: &[Transfer]) -> Result<Vec<String>, ApiError>;

    /// Selects tips, attaches, stores and broadcasts `trytes`.
    ///
    /// A `depth` or `min_weight_magnitude` of 0 is replaced by the value
    /// configured for the node that serves the request.
    async fn send_trytes(
        &self,
        trytes: &[String],
        depth: u32,
        min_weight_magnitude: u8,
    ) -> Result<Vec<Transaction>, ApiError>;
}

//! HTTP client for the node API, load balanced across the nodes of one
//! network.
//!
//! Every command is a JSON `POST` carrying the `X-IOTA-API-Version` header.
//! Transport failures and server errors move on to the next node; a
//! command the node rejects is returned to the caller immediately.

use std::sync::Arc;

use dioxus_logger::tracing;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use serde_json::Value;
use thiserror::Error;

use crate::bundle;
use crate::bundle::Transfer;
use crate::config::NodeConfiguration;
use crate::pow::LoadBalancerSettings;
use crate::tangle::TangleSubmit;
use crate::transaction;
use crate::transaction::Transaction;
use crate::transaction::TransactionError;
use crate::trytes;
use crate::ApiError;

const API_VERSION_HEADER: &str = "X-IOTA-API-Version";
const API_VERSION: &str = "1";

/// Balances are reported for milestones with at least this confirmation
/// percentage.
const BALANCE_THRESHOLD: u8 = 100;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("{0}")]
    Command(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid transaction: {0}")]
    Transaction(#[from] TransactionError),

    #[error("No nodes configured for {0}")]
    NoNodes(String),

    #[error("Local proof of work failed: {0}")]
    Pow(String),
}

impl NodeError {
    /// Whether another node might succeed where this one failed.
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(status, _) => *status >= 500,
            Self::Request(_) | Self::InvalidResponse(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    exception: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HashesResponse {
    hashes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TrytesResponse {
    trytes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    balances: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TipsResponse {
    trunk_transaction: String,
    branch_transaction: String,
}

/// A pair of tips to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tips {
    pub trunk_transaction: String,
    pub branch_transaction: String,
}

#[derive(Debug, Clone)]
pub struct NodeClient {
    settings: Arc<LoadBalancerSettings>,
    http: reqwest::Client,
}

impl NodeClient {
    pub fn new(settings: Arc<LoadBalancerSettings>) -> Result<Self, NodeError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(settings.timeout());
        let http = builder.build()?;

        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &Arc<LoadBalancerSettings> {
        &self.settings
    }

    /// Runs one command, trying each node in rotation until one answers.
    ///
    /// `body` builds the request for a given node so that per-node depth
    /// and weight settings can be applied.
    async fn command<T, F>(&self, name: &str, body: F) -> Result<T, NodeError>
    where
        T: DeserializeOwned,
        F: Fn(&NodeConfiguration) -> Value,
    {
        let nodes = self.settings.rotation();
        if nodes.is_empty() {
            return Err(NodeError::NoNodes(self.settings.network().to_string()));
        }

        let mut last_error = None;
        for node in nodes {
            match self.send_to(node, name, body(node)).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() => {
                    tracing::warn!("{} failed on {}: {}", name, node.provider, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| NodeError::NoNodes(self.settings.network().to_string())))
    }

    async fn send_to<T: DeserializeOwned>(
        &self,
        node: &NodeConfiguration,
        name: &str,
        mut body: Value,
    ) -> Result<T, NodeError> {
        body["command"] = Value::String(name.to_string());
        tracing::debug!("→ {} {}", node.provider, name);

        let response = self
            .http
            .post(&node.provider)
            .header(API_VERSION_HEADER, API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|e| e.error.or(e.exception))
                .unwrap_or_else(|| text.clone());
            if status.is_client_error() {
                return Err(NodeError::Command(message));
            }
            return Err(NodeError::Http(status.as_u16(), message));
        }

        serde_json::from_str(&text)
            .map_err(|e| NodeError::InvalidResponse(format!("{} response: {}", name, e)))
    }

    pub async fn find_transactions(&self, field: &str, values: &[String]) -> Result<Vec<String>, NodeError> {
        let response: HashesResponse = self
            .command("findTransactions", |_| {
                let mut body = serde_json::Map::new();
                body.insert(field.to_string(), json!(values));
                Value::Object(body)
            })
            .await?;
        Ok(response.hashes)
    }

    /// Raw trytes for each hash. Unknown hashes come back as all `9`.
    pub async fn get_trytes(&self, hashes: &[String]) -> Result<Vec<String>, NodeError> {
        let response: TrytesResponse = self
            .command("getTrytes", |_| json!({ "hashes": hashes }))
            .await?;
        Ok(response.trytes)
    }

    /// Decoded transactions for the hashes the node knows.
    pub async fn get_transactions(&self, hashes: &[String]) -> Result<Vec<Transaction>, NodeError> {
        let trytes = self.get_trytes(hashes).await?;
        let transactions = trytes
            .iter()
            .filter(|t| !transaction::is_empty_trytes(t))
            .map(|t| Transaction::from_trytes(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    pub async fn get_balances(&self, addresses: &[String]) -> Result<Vec<u64>, NodeError> {
        let response: BalancesResponse = self
            .command("getBalances", |_| {
                json!({ "addresses": addresses, "threshold": BALANCE_THRESHOLD })
            })
            .await?;
        response
            .balances
            .iter()
            .map(|b| {
                b.parse::<u64>()
                    .map_err(|_| NodeError::InvalidResponse(format!("balance {}", b)))
            })
            .collect()
    }

    pub async fn get_transactions_to_approve(&self, depth: u32) -> Result<Tips, NodeError> {
        let response: TipsResponse = self
            .command("getTransactionsToApprove", |node| {
                json!({ "depth": if depth == 0 { node.depth } else { depth } })
            })
            .await?;
        Ok(Tips {
            trunk_transaction: response.trunk_transaction,
            branch_transaction: response.branch_transaction,
        })
    }

    /// Attaches `trytes` on top of `tips`, locally when a proof of work
    /// provider is installed and on a node otherwise.
    pub async fn attach_to_tangle(
        &self,
        tips: &Tips,
        min_weight_magnitude: u8,
        trytes: &[String],
    ) -> Result<Vec<String>, NodeError> {
        if let Some(pow) = self.settings.pow_provider() {
            let mwm = match min_weight_magnitude {
                0 => self.settings.nodes().first().map(|n| n.mwm).unwrap_or_default(),
                mwm => mwm,
            };
            tracing::info!("attaching {} transactions with {}", trytes.len(), pow.name());
            return pow
                .attach_to_tangle(&tips.trunk_transaction, &tips.branch_transaction, mwm, trytes)
                .map_err(|e| NodeError::Pow(e.to_string()));
        }

        let response: TrytesResponse = self
            .command("attachToTangle", |node| {
                json!({
                    "trunkTransaction": tips.trunk_transaction,
                    "branchTransaction": tips.branch_transaction,
                    "minWeightMagnitude": if min_weight_magnitude == 0 { node.mwm } else { min_weight_magnitude },
                    "trytes": trytes,
                })
            })
            .await?;
        Ok(response.trytes)
    }

    pub async fn store_transactions(&self, trytes: &[String]) -> Result<(), NodeError> {
        let _: Value = self
            .command("storeTransactions", |_| json!({ "trytes": trytes }))
            .await?;
        Ok(())
    }

    pub async fn broadcast_transactions(&self, trytes: &[String]) -> Result<(), NodeError> {
        let _: Value = self
            .command("broadcastTransactions", |_| json!({ "trytes": trytes }))
            .await?;
        Ok(())
    }
}

impl TangleSubmit for NodeClient {
    async fn prepare_transfers(&self, seed: &str, transfers: &[Transfer]) -> Result<Vec<String>, ApiError> {
        if !trytes::is_trytes_of_exact_length(seed, trytes::HASH_TRYTES) {
            anyhow::bail!("seed must be 81 trytes");
        }
        let timestamp = web_time::SystemTime::now()
            .duration_since(web_time::SystemTime::UNIX_EPOCH)?
            .as_secs() as i64;
        Ok(bundle::prepare_transfers(transfers, timestamp)?)
    }

    async fn send_trytes(
        &self,
        trytes: &[String],
        depth: u32,
        min_weight_magnitude: u8,
    ) -> Result<Vec<Transaction>, ApiError> {
        let tips = self.get_transactions_to_approve(depth).await?;
        let attached = self.attach_to_tangle(&tips, min_weight_magnitude, trytes).await?;
        self.store_transactions(&attached).await?;
        self.broadcast_transactions(&attached).await?;

        let transactions = attached
            .iter()
            .map(|t| Transaction::from_trytes(t))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(
            "sent bundle {}",
            transactions.first().map(|t| t.bundle.as_str()).unwrap_or_default()
        );
        Ok(transactions)
    }
}

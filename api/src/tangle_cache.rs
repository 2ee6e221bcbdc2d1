//! Time-based caching in front of the node clients of every network.
#![allow(clippy::type_complexity)]

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use dioxus_logger::tracing;
use tokio::sync::RwLock;
use web_time::Instant;

use crate::hash_kind::HashKind;
use crate::network::Network;
use crate::node_client::NodeClient;
use crate::tangle::TangleQuery;
use crate::transaction::Transaction;
use crate::trytes;
use crate::trytes::HASH_TRYTES;
use crate::trytes::TAG_TRYTES;
use crate::ApiError;

#[derive(Clone, Debug)]
struct Cached<V> {
    value: V,
    last_fetched: Instant,
}

/// A lazily filled map whose entries expire after a fixed duration.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, Cached<V>>>,
    ttl: Duration,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the fresh entry for `key`, or runs `fetch` and stores its
    /// result. Errors are not cached.
    ///
    /// No lock is held while `fetch` runs, so a slow miss never delays
    /// lookups of other keys. Concurrent misses on the same key may each
    /// fetch; the last one to finish is stored.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        {
            let read_lock = self.entries.read().await;
            if let Some(cached) = read_lock.get(&key) {
                if cached.last_fetched.elapsed() < self.ttl {
                    return Ok(cached.value.clone());
                }
            }
        }

        let value = fetch().await?;

        let mut write_lock = self.entries.write().await;
        write_lock.retain(|_, c| c.last_fetched.elapsed() < self.ttl);
        write_lock.insert(
            key,
            Cached {
                value: value.clone(),
                last_fetched: Instant::now(),
            },
        );
        Ok(value)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Answers tangle queries for both networks, caching what the nodes return.
pub struct TangleCacheService {
    clients: HashMap<Network, NodeClient>,
    transactions: TtlCache<(Network, String), Option<Transaction>>,
    hashes: TtlCache<(Network, HashKind, String), Vec<String>>,
    balances: TtlCache<(Network, String), u64>,
}

impl TangleCacheService {
    pub fn with_clients(clients: HashMap<Network, NodeClient>, ttl: Duration) -> Self {
        Self {
            clients,
            transactions: TtlCache::new(ttl),
            hashes: TtlCache::new(ttl),
            balances: TtlCache::new(ttl),
        }
    }

    pub fn client(&self, network: Network) -> Result<&NodeClient, ApiError> {
        self.clients
            .get(&network)
            .ok_or_else(|| anyhow::anyhow!("no client configured for {}", network))
    }

    /// The lookup value sent to the node for a hash of the given kind.
    fn query_value(kind: HashKind, hash: &str) -> String {
        match kind {
            HashKind::Tag => trytes::pad_trytes(hash, TAG_TRYTES),
            _ => hash.chars().take(HASH_TRYTES).collect(),
        }
    }
}

impl TangleQuery for TangleCacheService {
    async fn get_transactions(&self, hashes: &[String], network: Network) -> Result<Vec<Transaction>, ApiError> {
        let client = self.client(network)?;
        let mut found = Vec::with_capacity(hashes.len());
        for hash in hashes {
            let cached = self
                .transactions
                .get_or_fetch((network, hash.clone()), || async {
                    let mut txs = client.get_transactions(std::slice::from_ref(hash)).await?;
                    Ok::<_, ApiError>(txs.pop())
                })
                .await?;
            found.extend(cached);
        }
        Ok(found)
    }

    async fn find_transaction_hashes(&self, kind: HashKind, hash: &str, network: Network) -> Result<Vec<String>, ApiError> {
        let Some(field) = kind.find_field() else {
            anyhow::bail!("{} hashes do not resolve to a list", kind);
        };
        let client = self.client(network)?;
        let value = Self::query_value(kind, hash);

        self.hashes
            .get_or_fetch((network, kind, value.clone()), || async {
                let hashes = client.find_transactions(field, &[value.clone()]).await?;
                tracing::info!("{} {} matched {} transactions", kind, value, hashes.len());
                Ok::<_, ApiError>(hashes)
            })
            .await
    }

    async fn get_address_balance(&self, address: &str, network: Network) -> Result<u64, ApiError> {
        let client = self.client(network)?;
        let address = Self::query_value(HashKind::Address, address);

        self.balances
            .get_or_fetch((network, address.clone()), || async {
                let balances = client.get_balances(&[address.clone()]).await?;
                Ok::<_, ApiError>(balances.first().copied().unwrap_or_default())
            })
            .await
    }
}

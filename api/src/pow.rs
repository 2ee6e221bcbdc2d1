//! Load balancing across nodes and scoping of local proof of work.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dioxus_logger::tracing;
use parking_lot::Mutex;

use crate::config::NetworkConfiguration;
use crate::config::NodeConfiguration;
use crate::network::Network;
use crate::ApiError;

/// Performs `attachToTangle` without a node.
///
/// Implementations are expected to be CPU bound; callers decide which
/// executor runs them.
pub trait PowProvider: Send + Sync {
    /// Returns the attached trytes, in the order given.
    fn attach_to_tangle(
        &self,
        trunk_transaction: &str,
        branch_transaction: &str,
        min_weight_magnitude: u8,
        trytes: &[String],
    ) -> Result<Vec<String>, ApiError>;

    fn name(&self) -> &str;

    /// Called when the provider becomes active for a submission.
    fn on_attach(&self) {}

    /// Called once the submission that activated it has finished.
    fn on_detach(&self) {}
}

/// The node list for one network, the round-robin cursor over it and the
/// optional local proof of work override.
pub struct LoadBalancerSettings {
    network: Network,
    nodes: Vec<NodeConfiguration>,
    cursor: AtomicUsize,
    timeout: Duration,
    pow: Mutex<PowSlot>,
}

/// The installed provider and how many live guards share it.
#[derive(Default)]
struct PowSlot {
    provider: Option<Arc<dyn PowProvider>>,
    holders: usize,
}

impl std::fmt::Debug for LoadBalancerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBalancerSettings")
            .field("network", &self.network)
            .field("nodes", &self.nodes)
            .field("timeout", &self.timeout)
            .field("pow", &self.pow.lock().provider.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

impl LoadBalancerSettings {
    pub fn new(config: &NetworkConfiguration) -> Self {
        Self {
            network: config.network,
            nodes: config.nodes.clone(),
            cursor: AtomicUsize::new(0),
            timeout: Duration::from_secs(config.timeout_secs),
            pow: Mutex::new(PowSlot::default()),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn nodes(&self) -> &[NodeConfiguration] {
        &self.nodes
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The nodes in the order they should be tried for the next request.
    ///
    /// Each call advances the starting node by one, so consecutive requests
    /// spread across the list while every request can still fail over to
    /// every node.
    pub fn rotation(&self) -> Vec<&NodeConfiguration> {
        if self.nodes.is_empty() {
            return Vec::new();
        }
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % self.nodes.len();
        self.nodes[start..].iter().chain(&self.nodes[..start]).collect()
    }

    /// The provider currently overriding the nodes' `attachToTangle`.
    pub fn pow_provider(&self) -> Option<Arc<dyn PowProvider>> {
        self.pow.lock().provider.clone()
    }

    /// The first holder installs `provider`; later holders share whatever
    /// is already installed.
    fn acquire_pow(&self, provider: &Arc<dyn PowProvider>) {
        let mut slot = self.pow.lock();
        if slot.holders == 0 {
            slot.provider = Some(provider.clone());
        }
        slot.holders += 1;
    }

    /// The last holder to leave uninstalls the provider.
    fn release_pow(&self) {
        let mut slot = self.pow.lock();
        slot.holders = slot.holders.saturating_sub(1);
        if slot.holders == 0 {
            slot.provider = None;
        }
    }
}

/// Keeps a local proof of work provider installed on a
/// [`LoadBalancerSettings`] for as long as the guard lives.
///
/// Guards on the same settings may overlap and be dropped in any order:
/// the provider stays installed until the last of them is dropped. Each
/// guard calls [`PowProvider::on_detach`] once when it is dropped, on both
/// the success and error paths of whatever ran inside the scope.
#[must_use = "local proof of work is detached as soon as the guard is dropped"]
pub struct LocalPowGuard {
    settings: Arc<LoadBalancerSettings>,
    active: Option<Arc<dyn PowProvider>>,
}

impl LocalPowGuard {
    /// Installs `provider`. With `None` the nodes' own `attachToTangle` is
    /// used and dropping the guard does nothing.
    pub fn enable(settings: Arc<LoadBalancerSettings>, provider: Option<Arc<dyn PowProvider>>) -> Self {
        if let Some(p) = &provider {
            tracing::info!("enabling local pow provider {} on {}", p.name(), settings.network());
            p.on_attach();
            settings.acquire_pow(p);
        }
        Self {
            settings,
            active: provider,
        }
    }
}

impl Drop for LocalPowGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.active.take() {
            self.settings.release_pow();
            provider.on_detach();
            tracing::info!("disabled local pow provider {}", provider.name());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Counts hook calls and echoes the trytes back.
    #[derive(Default)]
    pub struct CountingPow {
        pub attached: AtomicUsize,
        pub detached: AtomicUsize,
    }

    impl PowProvider for CountingPow {
        fn attach_to_tangle(
            &self,
            _trunk: &str,
            _branch: &str,
            _mwm: u8,
            trytes: &[String],
        ) -> Result<Vec<String>, ApiError> {
            Ok(trytes.to_vec())
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn on_attach(&self) {
            self.attached.fetch_add(1, Ordering::SeqCst);
        }

        fn on_detach(&self) {
            self.detached.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn settings() -> Arc<LoadBalancerSettings> {
        let mut config = NetworkConfiguration::default_for(Network::Devnet);
        config.nodes = vec![
            NodeConfiguration::new("http://a", 3, 9),
            NodeConfiguration::new("http://b", 3, 9),
            NodeConfiguration::new("http://c", 3, 9),
        ];
        Arc::new(LoadBalancerSettings::new(&config))
    }

    #[test]
    fn rotation_advances_start_node() {
        let settings = settings();
        let providers = |s: &LoadBalancerSettings| {
            s.rotation()
                .into_iter()
                .map(|n| n.provider.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(providers(&settings), ["http://a", "http://b", "http://c"]);
        assert_eq!(providers(&settings), ["http://b", "http://c", "http://a"]);
        assert_eq!(providers(&settings), ["http://c", "http://a", "http://b"]);
        assert_eq!(providers(&settings), ["http://a", "http://b", "http://c"]);
    }

    #[test]
    fn guard_detaches_exactly_once() {
        let settings = settings();
        let pow = Arc::new(CountingPow::default());

        {
            let _guard = LocalPowGuard::enable(settings.clone(), Some(pow.clone()));
            assert_eq!(pow.attached.load(Ordering::SeqCst), 1);
            assert!(settings.pow_provider().is_some());
        }

        assert_eq!(pow.detached.load(Ordering::SeqCst), 1);
        assert!(settings.pow_provider().is_none());
    }

    #[test]
    fn guard_detaches_on_error_path() {
        let settings = settings();
        let pow = Arc::new(CountingPow::default());

        let run = || -> Result<(), ApiError> {
            let _guard = LocalPowGuard::enable(settings.clone(), Some(pow.clone()));
            anyhow::bail!("node rejected the bundle")
        };
        assert!(run().is_err());

        assert_eq!(pow.attached.load(Ordering::SeqCst), 1);
        assert_eq!(pow.detached.load(Ordering::SeqCst), 1);
        assert!(settings.pow_provider().is_none());
    }

    #[test]
    fn guard_without_provider_is_inert() {
        let settings = settings();
        let guard = LocalPowGuard::enable(settings.clone(), None);
        assert!(settings.pow_provider().is_none());
        drop(guard);
        assert!(settings.pow_provider().is_none());
    }

    #[test]
    fn overlapping_guards_keep_provider_until_last_drop() {
        let settings = settings();
        let pow = Arc::new(CountingPow::default());

        let first = LocalPowGuard::enable(settings.clone(), Some(pow.clone()));
        let second = LocalPowGuard::enable(settings.clone(), Some(pow.clone()));

        // Dropped in creation order, not reverse.
        drop(first);
        assert!(settings.pow_provider().is_some());
        assert_eq!(pow.detached.load(Ordering::SeqCst), 1);

        drop(second);
        assert!(settings.pow_provider().is_none());
        assert_eq!(pow.attached.load(Ordering::SeqCst), 2);
        assert_eq!(pow.detached.load(Ordering::SeqCst), 2);

        let again = LocalPowGuard::enable(settings.clone(), Some(pow.clone()));
        assert!(settings.pow_provider().is_some());
        drop(again);
        assert!(settings.pow_provider().is_none());
    }
}

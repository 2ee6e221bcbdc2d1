use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use api::config::AppConfig;
use api::network::Network;
use api::node_client::NodeClient;
use api::pow::LoadBalancerSettings;
use api::pow::PowProvider;
use api::tangle_cache::TangleCacheService;
use api::ApiError;

use crate::state::simple_transaction::SubmitBackend;

pub struct AppStateData {
    pub config: AppConfig,
    pub tangle: TangleCacheService,
    load_balancers: HashMap<Network, Arc<LoadBalancerSettings>>,
    pow: Option<Arc<dyn PowProvider>>,
}

/// The stable, non-reactive state shared by every screen.
#[derive(Clone)]
pub struct AppState(Arc<AppStateData>);

impl PartialEq for AppState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for AppState {
    type Target = AppStateData;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        Self::with_pow(config, None)
    }

    /// For launchers that bundle a native [`PowProvider`]. `App` calls
    /// [`AppState::new`], so the shipped apps leave attachment to the nodes.
    ///
    /// `pow` is installed on a network's load balancer for the duration of
    /// each submission.
    pub fn with_pow(config: AppConfig, pow: Option<Arc<dyn PowProvider>>) -> Result<Self, ApiError> {
        let mut load_balancers = HashMap::new();
        let mut clients = HashMap::new();
        for network in [Network::Mainnet, Network::Devnet] {
            let settings = Arc::new(LoadBalancerSettings::new(config.network(network)));
            clients.insert(network, NodeClient::new(settings.clone())?);
            load_balancers.insert(network, settings);
        }
        let tangle = TangleCacheService::with_clients(clients, Duration::from_secs(config.cache_ttl_secs));

        Ok(Self(Arc::new(AppStateData {
            config,
            tangle,
            load_balancers,
            pow,
        })))
    }

    pub fn max_listed_hashes(&self) -> usize {
        self.config.max_listed_hashes
    }
}

impl SubmitBackend for AppState {
    type Api = NodeClient;

    fn load_balancer(&self, network: Network) -> Arc<LoadBalancerSettings> {
        match self.load_balancers.get(&network) {
            Some(settings) => settings.clone(),
            None => Arc::new(LoadBalancerSettings::new(self.config.network(network))),
        }
    }

    fn pow_provider(&self) -> Option<Arc<dyn PowProvider>> {
        self.pow.clone()
    }

    fn compose_api(&self, settings: Arc<LoadBalancerSettings>) -> Result<NodeClient, ApiError> {
        Ok(NodeClient::new(settings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_balancers_are_shared_per_network() {
        let state = AppState::new(AppConfig::default()).unwrap();
        let a = state.load_balancer(Network::Devnet);
        let b = state.load_balancer(Network::Devnet);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.network(), Network::Devnet);
        assert!(state.pow_provider().is_none());
        assert_eq!(state.max_listed_hashes(), 250);
        assert!(state.clone() == state);
    }

    struct EchoPow;

    impl PowProvider for EchoPow {
        fn attach_to_tangle(&self, _: &str, _: &str, _: u8, trytes: &[String]) -> Result<Vec<String>, ApiError> {
            Ok(trytes.to_vec())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn pow_provider_is_offered_but_not_installed() {
        let state = AppState::with_pow(AppConfig::default(), Some(Arc::new(EchoPow))).unwrap();
        assert_eq!(state.pow_provider().map(|p| p.name().to_string()), Some("echo".to_string()));
        // Installed only while a submission holds its guard.
        assert!(state.load_balancer(Network::Mainnet).pow_provider().is_none());
    }
}

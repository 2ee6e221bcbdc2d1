//! The simple transaction form: composing and attaching a zero-value
//! message transaction.

use std::sync::Arc;

use api::bundle::Transfer;
use api::network::Network;
use api::pow::LoadBalancerSettings;
use api::pow::LocalPowGuard;
use api::pow::PowProvider;
use api::tangle::TangleSubmit;
use api::trytes;
use api::trytes::HASH_TRYTES;
use api::ApiError;
use dioxus_logger::tracing;

use super::scope::ViewScope;
use crate::validation;

pub const POW_STATUS: &str = "Performing Local Proof of Work, please wait...";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::EnumIs)]
pub enum SubmitPhase {
    #[default]
    Editing,
    Submitting,
    Settled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitEvent {
    AddressChanged(String),
    MessageChanged(String),
    TagChanged(String),
    NetworkChanged(Network),
    SubmitRequested,
    Submitted { transaction_hash: String },
    Failed { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SimpleTransactionState {
    pub address: String,
    pub message: String,
    pub tag: String,
    pub network: Network,
    pub address_validation: String,
    pub tag_validation: String,
    pub is_valid: bool,
    pub is_busy: bool,
    pub status: String,
    pub is_errored: bool,
    pub transaction_hash: String,
    pub phase: SubmitPhase,
}

impl SimpleTransactionState {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Default::default()
        }
    }

    pub fn can_submit(&self) -> bool {
        self.is_valid && !self.is_busy
    }

    fn revalidate(mut self) -> Self {
        self.address_validation = validation::validate_address_field(&self.address)
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        self.tag_validation = validation::validate_tag_field(&self.tag)
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        self.is_valid = self.address_validation.is_empty() && self.tag_validation.is_empty();
        self
    }

    pub fn apply(self, event: SubmitEvent) -> Self {
        match event {
            // The form is read only while submitting.
            SubmitEvent::AddressChanged(_)
            | SubmitEvent::MessageChanged(_)
            | SubmitEvent::TagChanged(_)
            | SubmitEvent::NetworkChanged(_)
                if self.is_busy =>
            {
                self
            }
            SubmitEvent::AddressChanged(address) => Self { address, ..self }.revalidate(),
            SubmitEvent::TagChanged(tag) => Self { tag, ..self }.revalidate(),
            SubmitEvent::MessageChanged(message) => Self { message, ..self },
            SubmitEvent::NetworkChanged(network) => Self { network, ..self },
            SubmitEvent::SubmitRequested if self.can_submit() => Self {
                is_busy: true,
                status: POW_STATUS.to_string(),
                is_errored: false,
                transaction_hash: String::new(),
                phase: SubmitPhase::Submitting,
                ..self
            },
            SubmitEvent::Submitted { transaction_hash } if self.phase.is_submitting() => Self {
                is_busy: false,
                status: String::new(),
                is_errored: false,
                transaction_hash,
                phase: SubmitPhase::Settled,
                ..self
            },
            SubmitEvent::Failed { message } if self.phase.is_submitting() => Self {
                is_busy: false,
                status: message,
                is_errored: true,
                phase: SubmitPhase::Settled,
                ..self
            },
            _ => self,
        }
    }

    /// The zero-value transfer described by the form.
    pub fn transfer(&self) -> Transfer {
        Transfer {
            address: self.address.to_uppercase(),
            value: 0,
            tag: self.tag.to_uppercase(),
            message: trytes::text_to_trytes(&self.message),
        }
    }
}

/// Where submissions get their node settings, proof of work and API from.
pub trait SubmitBackend {
    type Api: TangleSubmit;

    fn load_balancer(&self, network: Network) -> Arc<LoadBalancerSettings>;

    /// The provider to install for the duration of a submission. `None`
    /// leaves attachment to the node.
    fn pow_provider(&self) -> Option<Arc<dyn PowProvider>>;

    fn compose_api(&self, settings: Arc<LoadBalancerSettings>) -> Result<Self::Api, ApiError>;
}

/// Attaches the form's transfer and reports how it went.
///
/// Local proof of work stays enabled on the network's load balancer until
/// this returns, whatever the outcome.
pub async fn submit<B: SubmitBackend>(backend: &B, state: &SimpleTransactionState) -> SubmitEvent {
    let settings = backend.load_balancer(state.network);
    let _pow = LocalPowGuard::enable(settings.clone(), backend.pow_provider());

    match attach(backend, settings, state.transfer()).await {
        Ok(transaction_hash) => {
            tracing::info!("attached transaction {}", transaction_hash);
            SubmitEvent::Submitted { transaction_hash }
        }
        Err(e) => {
            tracing::warn!("attach failed: {}", e);
            SubmitEvent::Failed {
                message: e.to_string(),
            }
        }
    }
}

async fn attach<B: SubmitBackend>(
    backend: &B,
    settings: Arc<LoadBalancerSettings>,
    transfer: Transfer,
) -> Result<String, ApiError> {
    let api = backend.compose_api(settings)?;
    let seed = "9".repeat(HASH_TRYTES);
    let trytes = api.prepare_transfers(&seed, &[transfer]).await?;

    // 0 lets the load balancer use each node's depth and weight.
    let transactions = api.send_trytes(&trytes, 0, 0).await?;
    transactions
        .first()
        .map(|tx| tx.hash.clone())
        .ok_or_else(|| anyhow::anyhow!("the node returned no transactions"))
}

/// Requests a submission, runs it and settles the form, committing each
/// new state while `scope` is live.
pub async fn run_submission<B: SubmitBackend>(
    backend: &B,
    scope: &ViewScope,
    state: SimpleTransactionState,
    mut commit: impl FnMut(&SimpleTransactionState),
) -> Option<SimpleTransactionState> {
    if !state.can_submit() {
        return Some(state);
    }
    let state = state.apply(SubmitEvent::SubmitRequested);
    commit(&state);

    let outcome = scope.settle(submit(backend, &state)).await?;
    let state = state.apply(outcome);
    commit(&state);
    Some(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::config::NetworkConfiguration;
    use api::transaction::Transaction;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingPow {
        attached: AtomicUsize,
        detached: AtomicUsize,
    }

    impl PowProvider for CountingPow {
        fn attach_to_tangle(&self, _: &str, _: &str, _: u8, trytes: &[String]) -> Result<Vec<String>, ApiError> {
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

    struct FakeApi {
        settings: Arc<LoadBalancerSettings>,
        fail_send: bool,
        sent: Arc<Mutex<Vec<(usize, u32, u8)>>>,
    }

    impl TangleSubmit for FakeApi {
        async fn prepare_transfers(&self, seed: &str, transfers: &[Transfer]) -> Result<Vec<String>, ApiError> {
            assert_eq!(seed, "9".repeat(81));
            Ok(api::bundle::prepare_transfers(transfers, 1_545_000_000)?)
        }

        async fn send_trytes(&self, trytes: &[String], depth: u32, mwm: u8) -> Result<Vec<Transaction>, ApiError> {
            // The provider must be installed while attaching.
            assert!(self.settings.pow_provider().is_some());
            self.sent.lock().unwrap().push((trytes.len(), depth, mwm));
            if self.fail_send {
                anyhow::bail!("Error: attachToTangle rejected");
            }
            Ok(trytes
                .iter()
                .map(|t| Transaction::from_trytes(t))
                .collect::<Result<_, _>>()?)
        }
    }

    struct FakeBackend {
        settings: Arc<LoadBalancerSettings>,
        pow: Arc<CountingPow>,
        fail_send: bool,
        sent: Arc<Mutex<Vec<(usize, u32, u8)>>>,
    }

    impl FakeBackend {
        fn new(fail_send: bool) -> Self {
            let config = NetworkConfiguration::default_for(Network::Devnet);
            Self {
                settings: Arc::new(LoadBalancerSettings::new(&config)),
                pow: Arc::new(CountingPow::default()),
                fail_send,
                sent: Arc::default(),
            }
        }
    }

    impl SubmitBackend for FakeBackend {
        type Api = FakeApi;

        fn load_balancer(&self, network: Network) -> Arc<LoadBalancerSettings> {
            assert_eq!(network, Network::Devnet);
            self.settings.clone()
        }

        fn pow_provider(&self) -> Option<Arc<dyn PowProvider>> {
            Some(self.pow.clone())
        }

        fn compose_api(&self, settings: Arc<LoadBalancerSettings>) -> Result<FakeApi, ApiError> {
            Ok(FakeApi {
                settings,
                fail_send: self.fail_send,
                sent: self.sent.clone(),
            })
        }
    }

    fn filled_form() -> SimpleTransactionState {
        SimpleTransactionState::new(Network::Devnet)
            .apply(SubmitEvent::AddressChanged("a".repeat(81)))
            .apply(SubmitEvent::TagChanged("explorer".to_string()))
            .apply(SubmitEvent::MessageChanged("hello tangle".to_string()))
    }

    #[test]
    fn fields_validate_as_they_change() {
        let state = SimpleTransactionState::new(Network::Mainnet)
            .apply(SubmitEvent::AddressChanged("A".repeat(80)));
        assert!(!state.is_valid);
        assert_eq!(
            state.address_validation,
            "The address hash must contain A-Z or 9 and be 81 or 90 trytes in length, it is length 80"
        );

        let state = state
            .apply(SubmitEvent::AddressChanged("A".repeat(90)))
            .apply(SubmitEvent::TagChanged("T".repeat(28)));
        assert!(state.address_validation.is_empty());
        assert!(!state.is_valid);
        assert!(state.tag_validation.ends_with("it is length 28"));

        let state = state.apply(SubmitEvent::TagChanged(String::new()));
        assert!(state.is_valid);
        assert!(state.can_submit());
    }

    #[tokio::test]
    async fn invalid_address_keeps_submit_disabled() {
        let backend = FakeBackend::new(false);
        let state = SimpleTransactionState::new(Network::Devnet)
            .apply(SubmitEvent::AddressChanged("A".repeat(80)));
        assert!(!state.can_submit());

        let requested = state.clone().apply(SubmitEvent::SubmitRequested);
        assert_eq!(requested, state);

        let mut commits = 0;
        let after = run_submission(&backend, &ViewScope::new(), state.clone(), |_| commits += 1).await;
        assert_eq!(after, Some(state));
        assert_eq!(commits, 0);
        assert_eq!(backend.pow.attached.load(Ordering::SeqCst), 0);
        assert!(backend.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_submission_records_hash() {
        let backend = FakeBackend::new(false);
        let mut seen = Vec::new();
        let state = run_submission(&backend, &ViewScope::new(), filled_form(), |s| seen.push(s.clone()))
            .await
            .unwrap();

        assert_eq!(seen[0].status, POW_STATUS);
        assert!(seen[0].is_busy);
        assert_eq!(state.phase, SubmitPhase::Settled);
        assert_eq!(state.transaction_hash.len(), 81);
        assert!(!state.is_errored);
        assert!(!state.is_busy);
        assert!(state.status.is_empty());

        assert_eq!(backend.pow.attached.load(Ordering::SeqCst), 1);
        assert_eq!(backend.pow.detached.load(Ordering::SeqCst), 1);
        assert!(backend.settings.pow_provider().is_none());
        assert_eq!(*backend.sent.lock().unwrap(), vec![(1, 0, 0)]);
    }

    #[tokio::test]
    async fn failed_submission_still_detaches() {
        let backend = FakeBackend::new(true);
        let state = run_submission(&backend, &ViewScope::new(), filled_form(), |_| {})
            .await
            .unwrap();

        assert!(state.is_errored);
        assert!(!state.is_busy);
        assert_eq!(state.status, "Error: attachToTangle rejected");
        assert!(state.transaction_hash.is_empty());

        assert_eq!(backend.pow.attached.load(Ordering::SeqCst), 1);
        assert_eq!(backend.pow.detached.load(Ordering::SeqCst), 1);
        assert!(backend.settings.pow_provider().is_none());
    }

    #[test]
    fn form_is_locked_while_submitting() {
        let submitting = filled_form().apply(SubmitEvent::SubmitRequested);
        assert!(submitting.is_busy);
        assert!(!submitting.can_submit());

        let unchanged = submitting.clone().apply(SubmitEvent::AddressChanged(String::new()));
        assert_eq!(unchanged, submitting);
        assert_eq!(submitting.clone().apply(SubmitEvent::SubmitRequested), submitting);
    }

    #[test]
    fn transfer_is_upper_cased_and_encoded() {
        let transfer = filled_form().transfer();
        assert_eq!(transfer.address, "A".repeat(81));
        assert_eq!(transfer.tag, "EXPLORER");
        assert_eq!(transfer.value, 0);
        assert_eq!(trytes::trytes_to_text(&transfer.message).as_deref(), Some("hello tangle"));
    }
}

//! The explore view as a state machine.
//!
//! [`ExploreState::apply`] is a pure transition function. The asynchronous
//! part lives in [`fetch`], which never fails: every outcome of the query is
//! classified into a [`QueryResult`]. [`load`] sequences the two and only
//! commits states while the view's [`ViewScope`] is live.

use api::hash_kind::HashKind;
use api::kerl;
use api::network::Network;
use api::tangle::TangleQuery;
use api::transaction::Transaction;
use api::ApiError;
use dioxus_logger::tracing;

use super::scope::ViewScope;
use crate::route::RouteParams;
use crate::validation;
use crate::validation::ValidationError;

pub const TRANSACTION_NOT_FOUND: &str = "Unable to find transaction on the tangle.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::EnumIs)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Querying,
    Settled,
    /// Absorbing: nothing changes once the view is gone.
    Unmounted,
}

/// What a query cycle produced.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryResult {
    SingleTransaction {
        payload: Transaction,
    },
    HashList {
        ids: Vec<String>,
        truncated: bool,
        total_count: usize,
        balance: Option<u64>,
        checksum: Option<String>,
    },
    NotFound {
        reason: String,
    },
    QueryFailed {
        message: String,
    },
}

/// An issued query. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryRequest {
    pub hash_kind: HashKind,
    pub hash: String,
    pub network: Network,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExploreEvent {
    Validated(Result<(), ValidationError>),
    QueryDispatched,
    QueryResolved(QueryResult),
    TornDown,
}

/// Outcome of mounting the view on a route.
#[derive(Clone, Debug, PartialEq)]
pub enum Mount {
    /// No hash was given; go back to search.
    Redirect,
    Ready(ExploreState),
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ExploreState {
    pub hash: String,
    pub checksum: String,
    pub hash_kind: HashKind,
    pub network: Network,
    pub is_valid: bool,
    pub validation_message: String,
    pub is_busy: bool,
    pub status: String,
    pub is_errored: bool,
    pub result: Option<QueryResult>,
    pub phase: Phase,
}

impl ExploreState {
    pub fn mount(params: &RouteParams) -> Mount {
        if params.hash.is_empty() {
            return Mount::Redirect;
        }
        Mount::Ready(Self {
            hash: params.hash.clone(),
            checksum: address_checksum(params.hash_kind, &params.hash).unwrap_or_default(),
            hash_kind: params.hash_kind,
            network: params.network,
            phase: Phase::Validating,
            ..Default::default()
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(&self.hash, self.hash_kind)
    }

    pub fn request(&self) -> QueryRequest {
        QueryRequest {
            hash_kind: self.hash_kind,
            hash: self.hash.clone(),
            network: self.network,
        }
    }

    pub fn apply(self, event: ExploreEvent) -> Self {
        if self.phase.is_unmounted() {
            return self;
        }

        match event {
            ExploreEvent::TornDown => Self {
                phase: Phase::Unmounted,
                ..self
            },
            ExploreEvent::Validated(Ok(())) => Self {
                is_valid: true,
                validation_message: String::new(),
                phase: Phase::Validating,
                ..self
            },
            ExploreEvent::Validated(Err(e)) => Self {
                is_valid: false,
                validation_message: e.to_string(),
                is_busy: false,
                result: None,
                phase: Phase::Idle,
                ..self
            },
            ExploreEvent::QueryDispatched if self.phase.is_validating() && self.is_valid => Self {
                is_busy: true,
                is_errored: false,
                status: format!("Loading from {} tangle, please wait...", self.network),
                result: None,
                phase: Phase::Querying,
                ..self
            },
            ExploreEvent::QueryResolved(result) if self.phase.is_querying() => {
                let (status, is_errored) = match &result {
                    QueryResult::NotFound { reason } => (reason.clone(), false),
                    QueryResult::QueryFailed { message } => (message.clone(), true),
                    _ => (String::new(), false),
                };
                let checksum = match &result {
                    QueryResult::HashList {
                        checksum: Some(checksum),
                        ..
                    } => checksum.clone(),
                    _ => self.checksum,
                };
                Self {
                    is_busy: false,
                    status,
                    is_errored,
                    checksum,
                    result: Some(result),
                    phase: Phase::Settled,
                    ..self
                }
            }
            _ => self,
        }
    }

    /// "N" or, when the list was capped, "N of TOTAL".
    pub fn count_label(&self) -> Option<String> {
        match &self.result {
            Some(QueryResult::HashList {
                ids,
                truncated,
                total_count,
                ..
            }) => Some(if *truncated {
                format!("{} of {}", ids.len(), total_count)
            } else {
                ids.len().to_string()
            }),
            _ => None,
        }
    }
}

fn address_checksum(kind: HashKind, hash: &str) -> Option<String> {
    match kind {
        HashKind::Address => kerl::address_checksum(hash).ok(),
        _ => None,
    }
}

fn not_found_in_list(kind: HashKind) -> String {
    format!(
        "Unable to find any transactions with the specified {} on the tangle, or the number of items was too large to return.",
        kind
    )
}

fn list_failed(kind: HashKind, err: &ApiError) -> String {
    format!(
        "An error occured while trying to retrieve the transactions with the specified {} on the tangle.\n\n{}",
        kind, err
    )
}

/// Runs the single query appropriate to the request's kind and classifies
/// the response. Lists longer than `max_listed` are truncated.
pub async fn fetch<Q: TangleQuery>(query: &Q, request: &QueryRequest, max_listed: usize) -> QueryResult {
    if request.hash_kind == HashKind::Transaction {
        return match query
            .get_transactions(std::slice::from_ref(&request.hash), request.network)
            .await
        {
            Ok(mut txs) if !txs.is_empty() => QueryResult::SingleTransaction {
                payload: txs.swap_remove(0),
            },
            Ok(_) => QueryResult::NotFound {
                reason: TRANSACTION_NOT_FOUND.to_string(),
            },
            Err(e) => {
                tracing::warn!("transaction query failed: {}", e);
                QueryResult::QueryFailed {
                    message: e.to_string(),
                }
            }
        };
    }

    match fetch_list(query, request).await {
        Ok(None) => QueryResult::NotFound {
            reason: not_found_in_list(request.hash_kind),
        },
        Ok(Some((mut ids, balance, checksum))) => {
            let total_count = ids.len();
            let truncated = total_count > max_listed;
            ids.truncate(max_listed);
            QueryResult::HashList {
                ids,
                truncated,
                total_count,
                balance,
                checksum,
            }
        }
        Err(e) => {
            tracing::warn!("{} query failed: {}", request.hash_kind, e);
            QueryResult::QueryFailed {
                message: list_failed(request.hash_kind, &e),
            }
        }
    }
}

async fn fetch_list<Q: TangleQuery>(
    query: &Q,
    request: &QueryRequest,
) -> Result<Option<(Vec<String>, Option<u64>, Option<String>)>, ApiError> {
    let ids = query
        .find_transaction_hashes(request.hash_kind, &request.hash, request.network)
        .await?;
    if ids.is_empty() {
        return Ok(None);
    }
    if request.hash_kind != HashKind::Address {
        return Ok(Some((ids, None, None)));
    }

    let balance = query.get_address_balance(&request.hash, request.network).await?;
    let checksum = kerl::address_checksum(&request.hash)?;
    Ok(Some((ids, Some(balance), Some(checksum))))
}

/// Validates, queries and settles `state`, handing every new state to
/// `commit` while `scope` is live.
///
/// Returns the last state committed.
pub async fn load<Q: TangleQuery>(
    query: &Q,
    scope: &ViewScope,
    max_listed: usize,
    state: ExploreState,
    mut commit: impl FnMut(&ExploreState),
) -> Option<ExploreState> {
    let validation = state.validate();
    let state = state.apply(ExploreEvent::Validated(validation));
    if !scope.is_live() {
        return None;
    }
    commit(&state);
    if !state.is_valid {
        return Some(state);
    }

    let state = state.apply(ExploreEvent::QueryDispatched);
    commit(&state);

    let request = state.request();
    let result = scope.settle(fetch(query, &request, max_listed)).await?;
    let state = state.apply(ExploreEvent::QueryResolved(result));
    commit(&state);
    Some(state)
}

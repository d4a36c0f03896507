//! Query orchestration: turning a settled query into gateway calls and a single
//! combined status.
//!
//! The orchestrator itself never touches the network. [`QueryOrchestrator::run_query`]
//! tells the caller which calls to issue, the caller spawns them (see [`spawn_fetch`])
//! and feeds every completion back through [`QueryOrchestrator::complete`]. All state is
//! keyed by the exact query string, so a late answer for `"ab"` can only ever land in
//! the cache, never in the status of `"abc"`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::SearchOptions;
use crate::search::{GatewayResult, Operation, SearchGateway, SearchResult, is_searchable};

pub use cache::{CacheKey, CacheLookup, ResultCache};
pub use merge::{compare_names, merge_results};
pub use status::{ErrorPrecedence, FetchStatus, QuerySnapshot, combine};

pub mod cache;
pub mod merge;
pub mod status;

/// Knobs of the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Queries shorter than this are not run
    pub min_query_length: usize,
    /// Size of the merged list
    pub max_results: usize,
    /// Number of `(operation, query)` entries kept in memory
    pub cache_capacity: usize,
    /// How long a cached answer is reused without asking again
    pub stale_after: Duration,
    /// Which error is reported when both calls fail
    pub error_precedence: ErrorPrecedence,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            min_query_length: crate::search::MIN_QUERY_LENGTH,
            max_results: crate::search::PAGE_SIZE,
            cache_capacity: 128,
            stale_after: Duration::from_secs(300),
            error_precedence: ErrorPrecedence::default(),
        }
    }
}

impl From<&SearchOptions> for OrchestratorOptions {
    fn from(options: &SearchOptions) -> Self {
        Self {
            min_query_length: options.min_query_length,
            max_results: options.max_results,
            cache_capacity: options.cache_capacity,
            stale_after: Duration::from_secs(options.stale_after_secs),
            error_precedence: options.error_precedence,
        }
    }
}

/// A gateway call the caller has to issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Which endpoint
    pub operation: Operation,
    /// Exact query string
    pub query: String,
}

/// A completed gateway call
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Which endpoint
    pub operation: Operation,
    /// The query the call was issued for
    pub query: String,
    /// Rows or failure
    pub result: GatewayResult<SearchResult>,
}

#[derive(Debug, Default)]
struct ActiveQuery {
    query: String,
    accounts: FetchStatus<Vec<SearchResult>>,
    repositories: FetchStatus<Vec<SearchResult>>,
}

impl ActiveQuery {
    fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Default::default()
        }
    }

    fn status(&self, operation: Operation) -> &FetchStatus<Vec<SearchResult>> {
        match operation {
            Operation::Accounts => &self.accounts,
            Operation::Repositories => &self.repositories,
        }
    }

    fn status_mut(&mut self, operation: Operation) -> &mut FetchStatus<Vec<SearchResult>> {
        match operation {
            Operation::Accounts => &mut self.accounts,
            Operation::Repositories => &mut self.repositories,
        }
    }
}

/// Tracks the two calls of the current query, the cache and what is in flight
pub struct QueryOrchestrator {
    options: OrchestratorOptions,
    cache: ResultCache,
    in_flight: HashSet<CacheKey>,
    active: ActiveQuery,
    snapshot: QuerySnapshot,
}

impl Default for QueryOrchestrator {
    fn default() -> Self {
        Self::new(OrchestratorOptions::default())
    }
}

impl QueryOrchestrator {
    /// Creates an orchestrator with an empty cache
    pub fn new(options: OrchestratorOptions) -> Self {
        let cache = ResultCache::new(options.cache_capacity, options.stale_after);
        let mut res = Self {
            options,
            cache,
            in_flight: HashSet::new(),
            active: ActiveQuery::default(),
            snapshot: QuerySnapshot::default(),
        };
        res.refresh_snapshot();
        res
    }

    /// The query the current statuses belong to
    pub fn query(&self) -> &str {
        &self.active.query
    }

    /// Whether the current query is too short to be run
    pub fn query_too_short(&self) -> bool {
        !is_searchable(&self.active.query, self.options.min_query_length)
    }

    /// Combined status of the current query
    pub fn snapshot(&self) -> &QuerySnapshot {
        &self.snapshot
    }

    /// Status of one call for the current query
    pub fn status(&self, operation: Operation) -> &FetchStatus<Vec<SearchResult>> {
        self.active.status(operation)
    }

    /// Whether a call for `(operation, query)` has been issued and not completed yet
    pub fn is_in_flight(&self, operation: Operation, query: &str) -> bool {
        self.in_flight.contains(&(operation, query.to_string()))
    }

    /// The in-memory cache
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Makes `query` the current query and returns the calls that must be issued for it.
    ///
    /// Settling on the query that is already current is a no-op. Calls that are already
    /// in flight or answered by a fresh cache entry are never requested again.
    pub fn run_query(&mut self, query: &str, now: Instant) -> Vec<FetchRequest> {
        if query == self.active.query {
            trace!("query {query:?} unchanged");
            return Vec::new();
        }
        self.active = ActiveQuery::new(query);

        let mut requests = Vec::new();
        if is_searchable(query, self.options.min_query_length) {
            for operation in Operation::ALL {
                let in_flight = self.in_flight.contains(&(operation, query.to_string()));
                let (cached, fresh) = match self.cache.lookup(operation, query, now) {
                    CacheLookup::Fresh(rows) => (Some(rows.to_vec()), true),
                    CacheLookup::Stale(rows) => (Some(rows.to_vec()), false),
                    CacheLookup::Miss => (None, false),
                };
                let status = match cached {
                    Some(rows) if fresh => {
                        debug!("{operation:?} {query:?}: cache hit");
                        FetchStatus::Success(rows)
                    }
                    Some(rows) => FetchStatus::Fetching(rows),
                    None => FetchStatus::Loading,
                };
                if !fresh && !in_flight {
                    debug!("{operation:?} {query:?}: requesting");
                    self.in_flight.insert((operation, query.to_string()));
                    requests.push(FetchRequest {
                        operation,
                        query: query.to_string(),
                    });
                }
                *self.active.status_mut(operation) = status;
            }
        }

        self.refresh_snapshot();
        requests
    }

    /// Folds a completed call into the cache and, if it belongs to the current query,
    /// into the current status. Returns whether the current snapshot changed.
    pub fn complete(&mut self, outcome: FetchOutcome, now: Instant) -> bool {
        let FetchOutcome {
            operation,
            query,
            result,
        } = outcome;
        self.in_flight.remove(&(operation, query.clone()));
        let is_current = query == self.active.query;

        match result {
            Ok(rows) => {
                debug!("{operation:?} {query:?}: {} rows", rows.len());
                self.cache.insert(operation, &query, rows.clone(), now);
                if is_current {
                    *self.active.status_mut(operation) = FetchStatus::Success(rows);
                }
            }
            Err(err) => {
                warn!("{operation:?} {query:?}: {err}");
                if is_current {
                    *self.active.status_mut(operation) = FetchStatus::Error(err);
                }
            }
        }

        if is_current {
            self.refresh_snapshot();
        } else {
            trace!("{operation:?} {query:?} superseded by {:?}", self.active.query);
        }
        is_current
    }

    fn refresh_snapshot(&mut self) {
        self.snapshot = combine(
            &self.active.accounts,
            &self.active.repositories,
            self.options.error_precedence,
            self.options.max_results,
        );
    }
}

/// Spawns one gateway call; its outcome is sent on `tx` unless `cancel` fires first
pub fn spawn_fetch(
    gateway: Arc<dyn SearchGateway>,
    request: FetchRequest,
    tx: UnboundedSender<FetchOutcome>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let FetchRequest { operation, query } = request;
        let result = tokio::select! {
            _ = cancel.cancelled() => None,
            result = operation.run(gateway.as_ref(), &query) => Some(result),
        };
        match result {
            Some(result) => {
                if tx.send(FetchOutcome { operation, query, result }).is_err() {
                    trace!("outcome receiver dropped");
                }
            }
            None => trace!("{operation:?} {query:?} cancelled"),
        }
    })
}

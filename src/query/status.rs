//! Per-call fetch status and the combinator deriving one snapshot from two calls.

use crate::search::{RemoteSearchError, SearchResult};

use super::merge::merge_results;

/// State of one remote call for the current query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus<T> {
    /// Not run (the query is below the minimum length, or nothing was asked yet)
    #[default]
    Idle,
    /// In flight, no data yet
    Loading,
    /// In flight, refreshing data that is already available
    Fetching(T),
    /// Completed with data
    Success(T),
    /// Completed with an error
    Error(RemoteSearchError),
}

impl<T> FetchStatus<T> {
    /// Whether a request is in flight
    pub fn is_in_flight(&self) -> bool {
        matches!(self, FetchStatus::Loading | FetchStatus::Fetching(_))
    }

    /// In flight and nothing to show yet
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }

    /// Available data, fresh or stale
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchStatus::Fetching(data) | FetchStatus::Success(data) => Some(data),
            _ => None,
        }
    }

    /// The failure, if the call completed with one
    pub fn error(&self) -> Option<&RemoteSearchError> {
        match self {
            FetchStatus::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// Which failure wins when both calls fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ErrorPrecedence {
    /// The account search error is reported
    #[default]
    Accounts,
    /// The repository search error is reported
    Repositories,
}

/// Everything the interaction layer needs to know about the current query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuerySnapshot {
    /// Merged list, present only once both calls have data
    pub results: Option<Vec<SearchResult>>,
    /// Either call is in flight without any data
    pub is_loading: bool,
    /// Either call is in flight
    pub is_fetching: bool,
    /// First failure; `None` while either call is still pending
    pub error: Option<RemoteSearchError>,
}

impl QuerySnapshot {
    /// Merged rows, empty when not available
    pub fn rows(&self) -> &[SearchResult] {
        self.results.as_deref().unwrap_or_default()
    }
}

/// Joins the two call states into one snapshot
pub fn combine(
    accounts: &FetchStatus<Vec<SearchResult>>,
    repositories: &FetchStatus<Vec<SearchResult>>,
    precedence: ErrorPrecedence,
    max_results: usize,
) -> QuerySnapshot {
    let is_loading = accounts.is_loading() || repositories.is_loading();
    let is_fetching = accounts.is_in_flight() || repositories.is_in_flight();

    let error = if is_fetching {
        None
    } else {
        let (first, second) = match precedence {
            ErrorPrecedence::Accounts => (accounts, repositories),
            ErrorPrecedence::Repositories => (repositories, accounts),
        };
        first.error().or_else(|| second.error()).cloned()
    };

    let results = match (accounts, repositories) {
        (FetchStatus::Idle, FetchStatus::Idle) => Some(Vec::new()),
        _ => match (accounts.data(), repositories.data()) {
            (Some(a), Some(r)) => Some(merge_results(a, r, max_results)),
            _ => None,
        },
    };

    QuerySnapshot {
        results,
        is_loading,
        is_fetching,
        error,
    }
}

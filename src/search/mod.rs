//! Search gateway: the two read-only remote operations the widget depends on.
//!
//! A gateway returns results already normalized into [`UserResult`] and
//! [`RepositoryResult`]. It never retries; retry policy belongs to its caller.

use futures::future::BoxFuture;

pub use error::{RemoteErrorKind, RemoteSearchError};
pub use github::{GitHubGateway, GitHubGatewayBuilder};
pub use model::{RepositoryResult, ResultKind, SearchResult, UserResult};

pub mod error;
pub mod github;
pub mod model;

/// Queries shorter than this (in characters) never reach the network
pub const MIN_QUERY_LENGTH: usize = 3;

/// Number of items requested from each endpoint
pub const PAGE_SIZE: usize = 50;

/// Result of a single gateway call
pub type GatewayResult<T> = Result<Vec<T>, RemoteSearchError>;

/// Remote search-by-keyword capability for accounts and repositories
pub trait SearchGateway: Send + Sync {
    /// Accounts matching `query`, best-followed first
    fn search_accounts<'a>(&'a self, query: &'a str) -> BoxFuture<'a, GatewayResult<UserResult>>;

    /// Repositories matching `query`, most-starred first
    fn search_repositories<'a>(&'a self, query: &'a str) -> BoxFuture<'a, GatewayResult<RepositoryResult>>;
}

/// The two remote operations, used as half of a cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`SearchGateway::search_accounts`]
    Accounts,
    /// [`SearchGateway::search_repositories`]
    Repositories,
}

impl Operation {
    /// Both operations, in merge order
    pub const ALL: [Operation; 2] = [Operation::Accounts, Operation::Repositories];

    /// Runs this operation against `gateway`, lifting the typed rows into [`SearchResult`]
    pub async fn run(self, gateway: &dyn SearchGateway, query: &str) -> GatewayResult<SearchResult> {
        match self {
            Operation::Accounts => Ok(gateway
                .search_accounts(query)
                .await?
                .into_iter()
                .map(SearchResult::User)
                .collect()),
            Operation::Repositories => Ok(gateway
                .search_repositories(query)
                .await?
                .into_iter()
                .map(SearchResult::Repository)
                .collect()),
        }
    }
}

/// Whether `query` is long enough to be sent
pub fn is_searchable(query: &str, min_len: usize) -> bool {
    !query.is_empty() && query.chars().count() >= min_len
}

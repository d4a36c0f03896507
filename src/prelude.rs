//! Convenience re-exports of commonly used types.
//!
//! `use ghsearch::prelude::*;` brings in everything needed to configure and run
//! the finder, or to host the widget with a custom gateway.

pub use crate::binds::KeyMap;
pub use crate::debounce::Debouncer;
pub use crate::options::{SearchOptions, SearchOptionsBuilder};
pub use crate::query::{ErrorPrecedence, FetchOutcome, QueryOrchestrator, QuerySnapshot};
pub use crate::search::{
    GatewayResult, GitHubGateway, GitHubGatewayBuilder, Operation, RemoteErrorKind, RemoteSearchError,
    RepositoryResult, SearchGateway, SearchResult, UserResult,
};
pub use crate::tui::{Action, Event, Size, Tui};
pub use crate::*;
pub use std::sync::Arc;

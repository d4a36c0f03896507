//! ghsearch is a search-as-you-type finder for GitHub users and repositories.
//!
//! Typing in the input settles into a query after a short inactivity delay;
//! accounts and repositories matching it are fetched concurrently, merged and
//! shown in a dropdown that can be driven with the keyboard or the mouse.
//! It can be used as a library or through the `ghs` binary.
//!
//! # Examples
//!
//! ```no_run
//! use ghsearch::prelude::*;
//!
//! let options = SearchOptionsBuilder::default()
//!     .query(Some("ratatui".to_string()))
//!     .height("50%".to_string())
//!     .build()
//!     .unwrap();
//!
//! let output = Finder::run_with(options).unwrap();
//! for url in output.opened {
//!     println!("{url}");
//! }
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate log;

pub use crate::finder::{Finder, FinderOutput};
pub use crate::opener::{Opener, SystemOpener};
pub use crate::options::{SearchOptions, SearchOptionsBuilder};
pub use crate::search::{RemoteSearchError, SearchGateway, SearchResult};
pub use crate::tui::{App, AppView, DropdownView};

pub mod binds;
pub mod debounce;
mod finder;
mod macros;
pub mod opener;
pub mod options;
pub mod prelude;
pub mod query;
pub mod search;
pub mod theme;
pub mod tui;

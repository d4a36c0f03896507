//! Configuration options for the finder.
//!
//! [`SearchOptions`] is both the library's configuration struct (through its builder)
//! and, with the `cli` feature, the `ghs` argument parser.

use derive_builder::Builder;

use crate::binds::KeyMap;
use crate::query::ErrorPrecedence;
use crate::search::{MIN_QUERY_LENGTH, PAGE_SIZE};

/// Message shown when a failed call carries no message of its own
pub const DEFAULT_FALLBACK_ERROR: &str = "Rate limit exceeded or failed to fetch results";

/// ghs - search GitHub users and repositories as you type
///
/// Type at least three characters; accounts and repositories matching the
/// query are merged into a single list. Enter opens the highlighted result in
/// the browser, Esc hides the list.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(name = "final_build"))]
#[builder(default)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(
    feature = "cli",
    command(name = "ghs", args_override_self = true, verbatim_doc_comment, version, about)
)]
pub struct SearchOptions {
    //  --- Search ---
    /// Base URL of the GitHub REST API
    #[cfg_attr(
        feature = "cli",
        arg(long, default_value = "https://api.github.com", help_heading = "Search")
    )]
    pub api_url: String,

    /// Personal access token
    ///
    /// Raises the API rate limit.
    #[cfg_attr(
        feature = "cli",
        arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help_heading = "Search")
    )]
    pub token: Option<String>,

    /// Minimum query length before anything is searched
    #[cfg_attr(feature = "cli", arg(long, default_value = "3", help_heading = "Search"))]
    pub min_query_length: usize,

    /// Items requested from each endpoint
    #[cfg_attr(feature = "cli", arg(long, default_value = "50", help_heading = "Search"))]
    pub page_size: usize,

    /// Maximum number of rows in the merged list
    #[cfg_attr(feature = "cli", arg(long, default_value = "50", help_heading = "Search"))]
    pub max_results: usize,

    /// Milliseconds of typing inactivity before the query is searched
    #[cfg_attr(feature = "cli", arg(long, default_value = "300", help_heading = "Search"))]
    pub debounce_ms: u64,

    /// Number of answers kept in memory
    #[cfg_attr(feature = "cli", arg(long, default_value = "128", help_heading = "Search"))]
    pub cache_capacity: usize,

    /// Seconds during which a cached answer is reused without asking again
    #[cfg_attr(feature = "cli", arg(long, default_value = "300", help_heading = "Search"))]
    pub stale_after_secs: u64,

    /// Which error is shown when both searches fail
    #[cfg_attr(
        feature = "cli",
        arg(long, default_value = "accounts", value_enum, help_heading = "Search")
    )]
    pub error_precedence: ErrorPrecedence,

    /// Message shown when a failure carries no message of its own
    #[cfg_attr(
        feature = "cli",
        arg(long, default_value = DEFAULT_FALLBACK_ERROR, help_heading = "Search")
    )]
    pub fallback_error: String,

    /// Value of the User-Agent header
    #[cfg_attr(
        feature = "cli",
        arg(long, default_value = concat!("ghsearch/", env!("CARGO_PKG_VERSION")), help_heading = "Search")
    )]
    pub user_agent: String,

    //  --- Interface ---
    /// Comma separated list of bindings
    ///
    /// Each binding has the form `<key>:<action>`; several actions can be chained with `+`.
    ///
    /// **Example**: `ghs --bind 'tab:down,ctrl-o:commit'`
    ///
    /// Actions: commit, dismiss, up, down, focus, set-query, abort, add-char,
    /// backward-char, forward-char, beginning-of-line, end-of-line,
    /// backward-delete-char, delete-char, kill-line, unix-line-discard,
    /// unix-word-rubout, ignore
    #[cfg_attr(
        feature = "cli",
        arg(short, long, help_heading = "Interface", verbatim_doc_comment, num_args=0..)
    )]
    pub bind: Vec<String>,

    /// Disable mouse
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Interface"))]
    pub no_mouse: bool,

    /// Set color theme
    ///
    /// Format: [BASE][,COMPONENT:COLOR[:ATTR1:ATTR2:..]]
    /// BASE: dark, light, 16, bw, none
    /// COMPONENT: normal, current, bg+, query, spinner, info, prompt, cursor, error, meta, description
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Interface", verbatim_doc_comment))]
    pub color: Option<String>,

    //  --- Layout ---
    /// Height of the finder
    ///
    /// Can either be a row count or a percentage
    #[cfg_attr(feature = "cli", arg(long, default_value = "40%", help_heading = "Layout"))]
    pub height: String,

    /// Set prompt
    #[cfg_attr(feature = "cli", arg(long, short, default_value = "> ", help_heading = "Layout"))]
    pub prompt: String,

    /// Initial query
    #[cfg_attr(feature = "cli", arg(long, short, help_heading = "Layout"))]
    pub query: Option<String>,

    //  --- Debugging ---
    /// Write logs to this file instead of stderr
    ///
    /// Verbosity is controlled by RUST_LOG.
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Debugging"))]
    pub log_file: Option<String>,

    /// The internal (parsed) keymap
    #[cfg_attr(feature = "cli", clap(skip))]
    pub keymap: KeyMap,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            api_url: String::from("https://api.github.com"),
            token: None,
            min_query_length: MIN_QUERY_LENGTH,
            page_size: PAGE_SIZE,
            max_results: PAGE_SIZE,
            debounce_ms: 300,
            cache_capacity: 128,
            stale_after_secs: 300,
            error_precedence: ErrorPrecedence::default(),
            fallback_error: String::from(DEFAULT_FALLBACK_ERROR),
            user_agent: String::from(concat!("ghsearch/", env!("CARGO_PKG_VERSION"))),
            bind: Vec::new(),
            no_mouse: false,
            color: None,
            height: String::from("40%"),
            prompt: String::from("> "),
            query: None,
            log_file: None,
            keymap: KeyMap::default(),
        }
    }
}

impl SearchOptionsBuilder {
    /// Builds the SearchOptions from the builder
    pub fn build(&mut self) -> Result<SearchOptions, SearchOptionsBuilderError> {
        self.final_build().map(|opts| opts.build())
    }
}

impl SearchOptions {
    /// Finalizes the options by parsing the key bindings
    pub fn build(mut self) -> Self {
        self.keymap = self.bind.iter().fold(KeyMap::default(), |mut res, part| {
            res.add_keymaps(part.split(','));
            res
        });
        self
    }
}

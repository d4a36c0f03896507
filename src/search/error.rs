//! Failures surfaced by a [`SearchGateway`](super::SearchGateway).

use std::fmt;

use thiserror::Error;

/// What went wrong while talking to the remote search endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The remote refused the request because the caller exhausted its quota
    RateLimited,
    /// Any other non-success status
    Status(u16),
    /// The request never produced a response (DNS, TLS, connection reset...)
    Transport,
    /// The response body could not be decoded
    Decode,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::RateLimited => f.write_str("rate limited"),
            RemoteErrorKind::Status(code) => write!(f, "status {code}"),
            RemoteErrorKind::Transport => f.write_str("transport failure"),
            RemoteErrorKind::Decode => f.write_str("invalid response"),
        }
    }
}

/// The only failure kind recognized by the search widget.
///
/// The message is kept exactly as the remote (or the transport) phrased it so the
/// UI can show it verbatim; it is optional because some failures carry nothing useful.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", describe(.kind, .message))]
pub struct RemoteSearchError {
    /// Classification of the failure
    pub kind: RemoteErrorKind,
    /// Human-readable description, if any
    pub message: Option<String>,
}

impl RemoteSearchError {
    /// Creates an error of the given kind with a message
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Creates an error of the given kind without any message
    pub fn bare(kind: RemoteErrorKind) -> Self {
        Self { kind, message: None }
    }

    /// Shorthand for a rate-limit failure
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::RateLimited, message)
    }

    /// Whether the remote rejected the call because of rate limiting
    pub fn is_rate_limit(&self) -> bool {
        self.kind == RemoteErrorKind::RateLimited
    }

    /// The message to show to the user, falling back to `fallback` when there is none
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.message.as_deref() {
            Some(m) if !m.trim().is_empty() => m,
            _ => fallback,
        }
    }
}

impl From<reqwest::Error> for RemoteSearchError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_decode() {
            RemoteErrorKind::Decode
        } else if let Some(status) = err.status() {
            RemoteErrorKind::Status(status.as_u16())
        } else {
            RemoteErrorKind::Transport
        };
        Self::new(kind, err.to_string())
    }
}

fn describe(kind: &RemoteErrorKind, message: &Option<String>) -> String {
    match message {
        Some(m) => m.clone(),
        None => kind.to_string(),
    }
}

/// Whether a status/body pair describes a rate-limit rejection
///
/// 429 always does. A 403 does when the quota header reports zero remaining calls
/// or the body mentions the rate limit.
pub(crate) fn looks_rate_limited(status: u16, remaining: Option<&str>, message: Option<&str>) -> bool {
    match status {
        429 => true,
        403 => {
            remaining.is_some_and(|r| r.trim() == "0")
                || message.is_some_and(|m| m.to_ascii_lowercase().contains("rate limit"))
        }
        _ => false,
    }
}

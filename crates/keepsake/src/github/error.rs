//! Search error types.

use std::time::Duration;

use thiserror::Error;

/// Why a search page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("invalid search URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("GitHub returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode search response: {0}")]
    Decode(String),

    #[error("search timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("search was cancelled")]
    Cancelled,
}

impl SearchError {
    /// Whether re-issuing the same query might succeed.
    ///
    /// A cancelled request was abandoned on purpose, so it is not retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Whether GitHub rejected the request for rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status: 403 | 429, .. })
    }
}

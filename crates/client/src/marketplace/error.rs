//! Marketplace API client error types.

use std::sync::Arc;

/// Errors from the upstream marketplace API client.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Upstream confirmed the listing does not exist.
    #[error("listing not found: {listing_id}")]
    NotFound { listing_id: u64 },

    /// Non-2xx response; the upstream body is kept for diagnostics.
    #[error("upstream HTTP error: {status}")]
    Http { status: u16, body: String },

    /// Request timeout.
    #[error("upstream request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search query parameters.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// No credential scheme configured for signing.
    #[error("missing upstream credentials")]
    MissingCredentials,

    /// Request signing failed.
    #[error("signing error: {0}")]
    Signing(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { UpstreamError::Timeout } else { UpstreamError::Network(Arc::new(err)) }
    }
}

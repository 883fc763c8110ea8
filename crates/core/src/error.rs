//! Unified error types for motormarket-core.

/// Errors raised by the cache and by input validation at the service
/// boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed caller input (e.g., a non-numeric listing id).
    #[error("invalid input: {0}")]
    Validation(String),

    /// Invalidation pattern failed to compile as a regular expression.
    #[error("invalid cache pattern: {0}")]
    InvalidPattern(String),

    /// Cached value could not be encoded or decoded.
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

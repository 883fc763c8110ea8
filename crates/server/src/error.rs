//! Service-boundary error mapping.
//!
//! Everything that can go wrong behind a route collapses into `ApiError`,
//! which carries enough to pick an HTTP status and a human-readable
//! message. Raw faults never cross the boundary.

use axum::http::StatusCode;
use motormarket_client::UpstreamError;

use crate::market::AggregateError;

/// Boundary-facing error with an HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed caller input (e.g., a non-numeric listing id).
    #[error("invalid request: {0}")]
    Validation(String),

    /// Upstream API failure.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Aggregation failure.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// Internal fault (cache serialization, bad invalidation pattern).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for the failure envelope.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(e) => upstream_status(e),
            ApiError::Aggregate(AggregateError::NoBrands) => StatusCode::BAD_REQUEST,
            ApiError::Aggregate(AggregateError::Upstream(e)) => upstream_status(e),
            ApiError::Aggregate(AggregateError::AllQueriesFailed) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn upstream_status(error: &UpstreamError) -> StatusCode {
    match error {
        UpstreamError::NotFound { .. } => StatusCode::NOT_FOUND,
        UpstreamError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        UpstreamError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        UpstreamError::MissingCredentials | UpstreamError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl From<motormarket_core::Error> for ApiError {
    fn from(err: motormarket_core::Error) -> Self {
        match err {
            motormarket_core::Error::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation("bad id".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Upstream(UpstreamError::NotFound { listing_id: 1 }).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Upstream(UpstreamError::Timeout).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ApiError::Upstream(UpstreamError::Http { status: 500, body: String::new() }).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Aggregate(AggregateError::AllQueriesFailed).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}

//! Response envelope for the presentation-layer boundary.
//!
//! Every route answers with `{ success, data?, error?, timestamp }`. The
//! presentation layer never sees a raw fault; failures arrive as a
//! human-readable message with an appropriate status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Success-or-failure envelope returned by every route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, timestamp: Utc::now() }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()), timestamp: Utc::now() }
    }
}

/// Shorthand for handler results carrying an envelope either way.
pub type EnvelopeResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Wrap a success value as a 200 envelope.
pub fn ok<T>(data: T) -> EnvelopeResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::ok(data))))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(%status, error = %self, "request failed");
        (status, Json(ApiResponse::<()>::err(self.to_string()))).into_response()
    }
}

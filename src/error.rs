//! Service error taxonomy
//!
//! Errors surfaced by HTTP handlers. Each variant maps to a status code via
//! `IntoResponse`; a failed operation always surfaces as a single error,
//! never a partially-populated success body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required service (e.g. the log rotation service) was never started
    #[error("service not available: {0}")]
    Unavailable(&'static str),

    /// Requested document does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request body failed validation beyond what axum's Json extractor rejects
    #[error("invalid request: {0}")]
    InvalidBody(String),

    /// A timestamp field was not valid RFC 3339
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    /// Missing or failed bearer-token authentication
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Directory listing failed during a query
    #[error("failed to read log directory: {0}")]
    ReadError(#[source] std::io::Error),

    /// Document store operation failed
    #[error("store operation failed: {0}")]
    Store(String),
}

impl ServiceError {
    fn status(&self) -> StatusCode {
        match self {
            ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidBody(_) | ServiceError::InvalidTimestamp(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::ReadError(_) | ServiceError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

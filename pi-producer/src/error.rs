//! Producer and HTTP error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while validating a request or generating its stream.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProducerError {
    /// The requested point count is not a usable positive integer.
    #[error("{0}")]
    InvalidInput(String),

    /// A chunk could not be serialized.
    #[error("failed to encode chunk: {0}")]
    Encode(#[from] serde_json::Error),

    /// The point source failed mid-stream.
    #[error("point generation failed: {0}")]
    Generation(String),

    /// The stream could not be set up.
    #[error("stream setup failed: {0}")]
    Setup(String),
}

/// An error answered before the stream opens, rendered as `{"error": "..."}`.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: the request itself is wrong.
    #[error("{0}")]
    InvalidInput(String),

    /// 500: the server could not set up the stream.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this error is answered with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProducerError> for ApiError {
    fn from(err: ProducerError) -> Self {
        match err {
            ProducerError::InvalidInput(msg) => Self::InvalidInput(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "estimate request failed");
        } else {
            tracing::debug!(error = %self, "estimate request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err: ApiError = ProducerError::InvalidInput("bad n".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "bad n");
    }

    #[test]
    fn setup_failure_maps_to_internal() {
        let err: ApiError = ProducerError::Setup("chunk size must be positive".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("chunk size"));
    }
}

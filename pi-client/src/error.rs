//! Client-side error types and HTTP error mapping.

use std::time::Duration;

use pi_types::EstimateError;
use thiserror::Error;

/// The connection could not be opened, or failed while streaming.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection-level failure (refused, DNS, TLS, reset before headers).
    #[error("connection failed: {0}")]
    Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The server's `error` field, or the raw body.
        message: String,
    },

    /// Reading the body failed after streaming started.
    #[error("stream read failed: {0}")]
    Read(String),

    /// The body ended without the stream signalling completion.
    #[error("stream ended before completion")]
    Incomplete,

    /// Opening the stream took too long.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl TransportError {
    /// Whether reopening the stream might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connect(_) | Self::Read(_) | Self::Incomplete | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500,
        }
    }
}

/// The worker could not produce an estimate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker task is gone or dropped the request.
    #[error("estimate worker is not running")]
    Closed,

    /// The estimator rejected the input.
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    /// The job died while computing; the worker itself keeps running.
    #[error("estimate job failed: {0}")]
    Failed(String),
}

/// Errors from a collect-then-estimate batch run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BatchError {
    /// Streaming failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The worker failed.
    #[error("worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Map a non-success response to [`TransportError::Status`].
///
/// The server sends `{"error": "<message>"}`; anything else is passed
/// through as the raw body.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> TransportError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    TransportError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Map a [`reqwest::Error`] raised while opening the stream.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    TransportError::Connect(Box::new(err))
}

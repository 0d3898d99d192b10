//! HTTP surface: `GET /estimate` and `GET /healthz`.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pi_protocol::Framing;
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ApiError, ProducerError};
use crate::producer::{encode, produce};
use crate::source::{SourceFactory, UniformSource};

/// Message returned for any unusable `n`.
pub const INVALID_N_MESSAGE: &str = "Invalid value for 'n'. Please provide a positive integer.";

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    sources: SourceFactory,
}

impl AppState {
    /// State with uniform point sources, seeded if the config says so.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let sources = UniformSource::factory(config.seed);
        Self {
            config: Arc::new(config),
            sources,
        }
    }

    /// Replace the point source factory (e.g. with a stub).
    #[must_use]
    pub fn with_sources(mut self, sources: SourceFactory) -> Self {
        self.sources = sources;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Query parameters for `/estimate`. Kept as strings so bad values get the
/// JSON error body instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
struct EstimateParams {
    n: Option<String>,
    framing: Option<String>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/estimate", get(estimate))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Parse and bound-check the requested point count.
///
/// Surrounding whitespace is tolerated; anything else that is not a base-10
/// integer in `1..=max_points` is rejected.
pub fn parse_point_count(raw: Option<&str>, max_points: u64) -> Result<u64, ProducerError> {
    let invalid = || ProducerError::InvalidInput(INVALID_N_MESSAGE.to_string());
    let n: i64 = raw.ok_or_else(invalid)?.trim().parse().map_err(|_| invalid())?;
    let n = u64::try_from(n).ok().filter(|&n| n > 0).ok_or_else(invalid)?;
    if n > max_points {
        return Err(ProducerError::InvalidInput(format!(
            "Invalid value for 'n'. At most {max_points} points may be requested."
        )));
    }
    Ok(n)
}

async fn estimate(
    State(state): State<AppState>,
    params: Result<Query<EstimateParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    let n = parse_point_count(params.n.as_deref(), state.config.max_points)?;
    let framing = match params.framing.as_deref() {
        Some(raw) => raw
            .parse::<Framing>()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?,
        None => state.config.framing,
    };

    let settings = state.config.producer_settings(framing);
    let emissions = produce(n, settings, (state.sources)())?;
    tracing::debug!(n, %framing, chunk_size = settings.chunk_size, "opening point stream");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, framing.content_type())
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(encode(framing, emissions)))
        .map_err(|e| ApiError::Internal(format!("failed to build response: {e}")))
}

async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_integers() {
        assert_eq!(parse_point_count(Some("4"), 10).unwrap(), 4);
        assert_eq!(parse_point_count(Some(" 10 "), 10).unwrap(), 10);
    }

    #[test]
    fn rejects_missing_zero_negative_and_garbage() {
        for raw in [None, Some(""), Some("0"), Some("-5"), Some("abc"), Some("12abc"), Some("1.5")] {
            assert!(
                matches!(parse_point_count(raw, 100), Err(ProducerError::InvalidInput(_))),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn rejects_above_max() {
        let err = parse_point_count(Some("101"), 100).unwrap_err();
        assert!(err.to_string().contains("100"));
    }
}

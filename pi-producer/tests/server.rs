//! Router-level tests for `/estimate` using `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use pi_producer::{AppState, PointSource, ProducerError, ServerConfig, router};
use pi_producer::{FixedSource, SourceFactory};
use pi_types::Point;
use std::sync::Arc;
use tower::ServiceExt;

fn fast_config() -> ServerConfig {
    ServerConfig {
        pacing_ms: 0,
        max_points: 1_000_000,
        ..ServerConfig::default()
    }
}

fn stub_points() -> Vec<Point> {
    vec![
        Point::new(0.5, 0.5),
        Point::new(0.7, 0.7),
        Point::new(-0.3, -0.4),
        Point::new(1.2, 1.2),
    ]
}

fn app(config: ServerConfig) -> Router {
    router(AppState::new(config))
}

fn stubbed_app(config: ServerConfig) -> Router {
    router(AppState::new(config).with_sources(FixedSource::factory(stub_points())))
}

async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn error_message(response: Response) -> String {
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    json["error"].as_str().unwrap().to_string()
}

fn points_in(payload: &str) -> usize {
    serde_json::from_str::<Vec<Point>>(payload).unwrap().len()
}

// --- Input validation ---

#[tokio::test]
async fn invalid_n_is_rejected_before_streaming() {
    let app = app(fast_config());
    for uri in [
        "/estimate",
        "/estimate?n=",
        "/estimate?n=0",
        "/estimate?n=-3",
        "/estimate?n=abc",
        "/estimate?n=4x",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {uri}");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            error_message(response).await,
            "Invalid value for 'n'. Please provide a positive integer."
        );
    }
}

#[tokio::test]
async fn n_above_limit_is_rejected() {
    let app = app(ServerConfig {
        max_points: 100,
        ..fast_config()
    });
    let response = get(&app, "/estimate?n=101").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.contains("100"));
}

#[tokio::test]
async fn unknown_framing_is_rejected() {
    let response = get(&app(fast_config()), "/estimate?n=5&framing=websocket").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.contains("websocket"));
}

#[tokio::test]
async fn unusable_chunk_size_is_internal_error() {
    let app = app(ServerConfig {
        chunk_size: Some(0),
        ..fast_config()
    });
    let response = get(&app, "/estimate?n=5").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_message(response).await.contains("chunk size"));
}

// --- Push framing ---

#[tokio::test]
async fn sse_body_is_framed_and_terminated() {
    let response = get(&stubbed_app(fast_config()), "/estimate?n=4").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );
    assert_eq!(
        body_text(response).await,
        "data: [{\"x\":0.5,\"y\":0.5},{\"x\":0.7,\"y\":0.7},{\"x\":-0.3,\"y\":-0.4},{\"x\":1.2,\"y\":1.2}]\n\n\
         data: [DONE]\n\n"
    );
}

#[tokio::test]
async fn sse_delivers_exactly_n_points() {
    let body = body_text(get(&app(fast_config()), "/estimate?n=2500").await).await;
    let frames: Vec<&str> = body
        .split("\n\n")
        .filter(|f| !f.is_empty())
        .map(|f| f.strip_prefix("data: ").unwrap())
        .collect();
    assert_eq!(frames.last(), Some(&"[DONE]"));
    assert_eq!(frames.iter().filter(|f| **f == "[DONE]").count(), 1);
    let sizes: Vec<usize> = frames[..frames.len() - 1]
        .iter()
        .map(|f| points_in(f))
        .collect();
    assert_eq!(sizes, vec![1000, 1000, 500]);
}

// --- Pull framing ---

#[tokio::test]
async fn ndjson_uses_small_chunks_and_no_sentinel() {
    let response = get(&app(fast_config()), "/estimate?n=25&framing=ndjson").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/stream+json"
    );
    let body = body_text(response).await;
    assert!(body.ends_with('\n'));
    assert!(!body.contains("[DONE]"));
    let sizes: Vec<usize> = body.lines().map(points_in).collect();
    assert_eq!(sizes, vec![10, 10, 5]);
}

#[tokio::test]
async fn configured_default_framing_applies() {
    let app = app(ServerConfig {
        framing: pi_protocol::Framing::Ndjson,
        chunk_size: Some(3),
        ..fast_config()
    });
    let body = body_text(get(&app, "/estimate?n=7").await).await;
    let sizes: Vec<usize> = body.lines().map(points_in).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
}

// --- Failure after the stream has started ---

struct Exhausting {
    left: usize,
}

impl PointSource for Exhausting {
    fn next_point(&mut self) -> Result<Point, ProducerError> {
        if self.left == 0 {
            return Err(ProducerError::Generation("source exhausted".into()));
        }
        self.left -= 1;
        Ok(Point::new(0.1, 0.1))
    }
}

#[tokio::test]
async fn generation_failure_aborts_body() {
    let sources: SourceFactory =
        Arc::new(|| -> Box<dyn PointSource> { Box::new(Exhausting { left: 15 }) });
    let app = router(
        AppState::new(ServerConfig {
            chunk_size: Some(10),
            ..fast_config()
        })
        .with_sources(sources),
    );
    let response = get(&app, "/estimate?n=30").await;
    // Headers are already committed; the failure surfaces as a body error.
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.into_body().collect().await.is_err());
}

// --- Health ---

#[tokio::test]
async fn healthz_reports_ok() {
    let response = get(&app(fast_config()), "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
}

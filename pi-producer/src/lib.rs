#![deny(missing_docs)]
//! Server side of the streaming estimator.
//!
//! `GET /estimate?n=<positive integer>[&framing=sse|ndjson]` answers with
//! exactly `n` uniformly sampled points, split into chunks of at most
//! `chunk_size` and paced by a short cooperative delay between chunks.
//! Invalid `n` is rejected with `400 {"error": "..."}` before any stream is
//! opened. A failure after the stream has started aborts the response body
//! instead of ending it cleanly, so a consumer can never mistake a truncated
//! stream for a complete one.
//!
//! Each request runs as one independent task with its own [`PointSource`];
//! nothing is shared or locked across requests.

pub mod config;
pub mod error;
pub mod plan;
pub mod producer;
pub mod server;
pub mod source;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ProducerError};
pub use plan::ChunkPlan;
pub use producer::{Emission, ProducerSettings, encode, produce};
pub use server::{AppState, parse_point_count, router, serve};
pub use source::{FixedSource, PointSource, SourceFactory, UniformSource};

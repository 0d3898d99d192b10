#![deny(missing_docs)]
//! Client side of the streaming estimator.
//!
//! [`EstimateClient`] opens `GET /estimate` and decodes the body into a
//! [`FrameStream`]. [`StreamConsumer`] folds that stream into a live estimate,
//! publishing a [`ConsumerSnapshot`] after every chunk, and owns the
//! connection for exactly as long as a run is active. For the batch path,
//! [`collect_points`] gathers the whole stream and an [`EstimateWorker`]
//! computes the estimate off the async threads.
//!
//! ```no_run
//! use pi_client::{EstimateClient, StreamConsumer};
//!
//! # async fn demo() {
//! let mut consumer = StreamConsumer::new(EstimateClient::new("http://localhost:3000"));
//! consumer.request(10_000).await;
//! let done = consumer.wait().await;
//! println!("pi ~= {}", done.estimate);
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod consumer;
pub mod error;
pub mod source;
pub mod streaming;
pub mod worker;

pub use batch::{collect_points, estimate_batch};
pub use client::EstimateClient;
pub use consumer::{
    CONNECT_FAILED_MESSAGE, ConsumerSnapshot, Phase, STREAM_FAILED_MESSAGE, StreamConsumer,
};
pub use error::{BatchError, TransportError, WorkerError};
pub use source::FrameSource;
pub use streaming::{FrameEvent, FrameStream};
pub use worker::{EstimateWorker, WorkerHandle, WorkerRequest};

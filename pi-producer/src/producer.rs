//! The paced point stream and its wire encoding.

use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use pi_protocol::{Framing, encode_chunk, encode_done};
use pi_types::Chunk;

use crate::error::ProducerError;
use crate::plan::ChunkPlan;
use crate::source::PointSource;

/// One step of a producer stream, before framing.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// A complete chunk of points.
    Chunk(Chunk),
    /// All chunks have been emitted.
    Done,
}

/// Per-request knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerSettings {
    /// Maximum points per chunk.
    pub chunk_size: usize,
    /// Delay between consecutive chunks. Zero still yields to the scheduler.
    pub pacing: Duration,
}

/// Stream exactly `total` points in chunks, then [`Emission::Done`].
///
/// Validation happens here, before the stream exists: an unusable chunk size
/// is returned as an error rather than as a stream that fails on first poll.
/// A generation failure mid-stream is yielded once as `Err` and ends the
/// stream; the failed chunk is never emitted partially and `Done` never
/// follows an error.
pub fn produce(
    total: u64,
    settings: ProducerSettings,
    mut source: Box<dyn PointSource>,
) -> Result<impl Stream<Item = Result<Emission, ProducerError>> + Send + 'static, ProducerError> {
    let plan = ChunkPlan::new(total, settings.chunk_size)?;
    let pacing = settings.pacing;

    Ok(async_stream::stream! {
        let chunks = plan.chunk_count();
        for (index, len) in plan.enumerate() {
            if index > 0 {
                pace(pacing).await;
            }
            match source.fill(len) {
                Ok(chunk) => yield Ok(Emission::Chunk(chunk)),
                Err(e) => {
                    tracing::error!(error = %e, chunk = index, chunks, "point generation failed");
                    yield Err(e);
                    return;
                }
            }
        }
        tracing::debug!(total, chunks, "point stream complete");
        yield Ok(Emission::Done);
    })
}

/// Frame a producer stream for the wire.
///
/// The first error is passed through and ends the stream, so the HTTP layer
/// aborts the body instead of closing it cleanly.
pub fn encode(
    framing: Framing,
    emissions: impl Stream<Item = Result<Emission, ProducerError>> + Send + 'static,
) -> impl Stream<Item = Result<Bytes, ProducerError>> + Send + 'static {
    async_stream::stream! {
        let mut emissions = std::pin::pin!(emissions);
        while let Some(item) = emissions.next().await {
            match item {
                Ok(Emission::Chunk(chunk)) => match encode_chunk(framing, &chunk) {
                    Ok(frame) => yield Ok(frame),
                    Err(e) => {
                        tracing::error!(error = %e, "chunk encoding failed");
                        yield Err(ProducerError::Encode(e));
                        return;
                    }
                },
                Ok(Emission::Done) => {
                    if let Some(frame) = encode_done(framing) {
                        yield Ok(frame);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    }
}

async fn pace(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}

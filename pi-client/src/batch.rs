//! Collect-then-estimate: the whole stream first, one estimate at the end.

use futures::StreamExt;
use pi_protocol::{Frame, decode_chunk};
use pi_types::PointCandidate;

use crate::error::{BatchError, TransportError};
use crate::source::FrameSource;
use crate::streaming::FrameEvent;
use crate::worker::WorkerHandle;

/// Stream `n` points and keep every valid one.
///
/// Invalid frames and points are skipped with a warning, as in the
/// incremental consumer. Fails if the stream cannot be opened or ends
/// without completing.
pub async fn collect_points<S: FrameSource>(
    source: &S,
    n: u64,
) -> Result<Vec<PointCandidate>, TransportError> {
    let mut frames = source.open(n).await?;
    let mut points = Vec::new();

    while let Some(event) = frames.receiver.next().await {
        match event {
            FrameEvent::Frame(Frame::Chunk(payload)) => match decode_chunk(&payload) {
                Ok(chunk) => {
                    for (index, candidate) in chunk.into_iter().enumerate() {
                        match candidate.validate() {
                            Ok(_) => points.push(candidate),
                            Err(reason) => {
                                tracing::warn!(index, %reason, "skipping invalid point");
                            }
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "skipping undecodable chunk"),
            },
            FrameEvent::Frame(Frame::Done) => {
                tracing::debug!(collected = points.len(), n, "point stream collected");
                return Ok(points);
            }
            FrameEvent::Malformed(e) => tracing::warn!(error = %e, "skipping malformed frame"),
            FrameEvent::Error(e) => return Err(e),
        }
    }
    Err(TransportError::Incomplete)
}

/// Collect `n` points, then hand them to `worker` in one request.
pub async fn estimate_batch<S: FrameSource>(
    source: &S,
    n: u64,
    worker: &WorkerHandle,
) -> Result<f64, BatchError> {
    let points = collect_points(source, n).await?;
    Ok(worker.estimate(points, n).await?)
}

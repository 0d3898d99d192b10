//! Off-thread estimation for the batch path.
//!
//! One request in, one reply out. The worker owns nothing the caller can
//! see; points move into it and only the number comes back.

use pi_types::{EstimateError, PointCandidate, estimate_candidates};
use tokio::sync::{mpsc, oneshot};

use crate::error::WorkerError;

/// Requests that may queue before `estimate` callers start waiting.
const QUEUE_DEPTH: usize = 8;

type Compute = fn(&[PointCandidate], u64) -> Result<f64, EstimateError>;

/// One estimation job.
#[derive(Debug)]
pub struct WorkerRequest {
    /// Every collected point, still in wire shape.
    pub points: Vec<PointCandidate>,
    /// The `n` that was requested.
    pub total: u64,
    /// Where the result goes.
    pub reply: oneshot::Sender<Result<f64, WorkerError>>,
}

/// The worker side: owns the request queue and runs each job on the
/// blocking pool.
#[derive(Debug)]
pub struct EstimateWorker {
    requests: mpsc::Receiver<WorkerRequest>,
    compute: Compute,
}

impl EstimateWorker {
    /// Spawn a worker task and return a handle to it. The task exits once
    /// every handle is dropped.
    #[must_use]
    pub fn spawn() -> WorkerHandle {
        Self::spawn_with(estimate_candidates)
    }

    pub(crate) fn spawn_with(compute: Compute) -> WorkerHandle {
        let (tx, requests) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(Self { requests, compute }.run());
        WorkerHandle { requests: tx }
    }

    async fn run(mut self) {
        while let Some(WorkerRequest {
            points,
            total,
            reply,
        }) = self.requests.recv().await
        {
            let count = points.len();
            let compute = self.compute;
            let result = match tokio::task::spawn_blocking(move || compute(&points, total)).await {
                Ok(result) => {
                    tracing::debug!(count, total, ok = result.is_ok(), "estimate computed");
                    result.map_err(WorkerError::from)
                }
                Err(e) => {
                    tracing::error!(error = %e, count, total, "estimate job failed");
                    Err(WorkerError::Failed(e.to_string()))
                }
            };
            // The caller may have given up waiting.
            let _ = reply.send(result);
        }
        tracing::debug!("estimate worker stopped");
    }
}

/// Cloneable sender side of an [`EstimateWorker`].
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    requests: mpsc::Sender<WorkerRequest>,
}

impl WorkerHandle {
    /// Estimate π from `points` against `total`.
    ///
    /// Shape-invalid points make the whole job fail with
    /// [`WorkerError::Estimate`]; a job that dies on the blocking pool
    /// fails with [`WorkerError::Failed`].
    pub async fn estimate(&self, points: Vec<PointCandidate>, total: u64) -> Result<f64, WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(WorkerRequest {
                points,
                total,
                reply,
            })
            .await
            .map_err(|_| WorkerError::Closed)?;
        rx.await.map_err(|_| WorkerError::Closed)?
    }
}

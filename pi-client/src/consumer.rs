//! The incremental stream consumer.
//!
//! A [`StreamConsumer`] runs at most one estimation at a time. Each run is a
//! spawned task that opens a [`FrameStream`], folds every chunk into its own
//! [`RunningState`] and publishes a [`ConsumerSnapshot`] after each one. The
//! snapshot channel is the only way state leaves the task.
//!
//! Lifecycle of a run:
//!
//! ```text
//! Idle --request(n>0)--> Connecting --opened--> Streaming --Done--> Completed
//!                            |                      |
//!                            +-- open fails --------+-- transport error --> Failed
//! ```
//!
//! Starting a new request, calling [`StreamConsumer::cancel`], or dropping the
//! consumer cancels the active run, which drops its stream and so releases
//! the connection.

use std::sync::Arc;

use futures::StreamExt;
use pi_protocol::{Frame, decode_chunk};
use pi_types::RunningState;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::source::FrameSource;
use crate::streaming::{FrameEvent, FrameStream};

/// Shown when the stream could not be opened.
pub const CONNECT_FAILED_MESSAGE: &str = "Failed to initialize the EventSource connection.";

/// Shown when the transport fails after streaming started.
pub const STREAM_FAILED_MESSAGE: &str = "An error occurred while streaming data.";

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// No run, or the last one was cancelled.
    #[default]
    Idle,
    /// Waiting for the stream to open.
    Connecting,
    /// Receiving chunks.
    Streaming,
    /// The stream signalled completion.
    Completed,
    /// The stream could not be opened or broke mid-way.
    Failed,
}

impl Phase {
    /// `Completed` or `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// `Connecting` or `Streaming`.
    #[must_use]
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Connecting | Self::Streaming)
    }
}

/// What observers see after every update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumerSnapshot {
    /// Lifecycle phase.
    pub phase: Phase,
    /// True while connecting or streaming.
    pub is_loading: bool,
    /// Current estimate, `4 * points_inside / total_requested`.
    pub estimate: f64,
    /// User-facing error message, set only in [`Phase::Failed`].
    pub error: Option<String>,
    /// Valid points received so far.
    pub points_seen: u64,
    /// Valid points inside the unit circle so far.
    pub points_inside: u64,
    /// The `n` this run asked for.
    pub total_requested: u64,
}

impl ConsumerSnapshot {
    fn connecting(total_requested: u64) -> Self {
        Self {
            phase: Phase::Connecting,
            is_loading: true,
            total_requested,
            ..Self::default()
        }
    }

    fn from_state(phase: Phase, state: &RunningState) -> Self {
        Self {
            phase,
            is_loading: phase.is_loading(),
            estimate: state.estimate(),
            error: None,
            points_seen: state.points_seen(),
            points_inside: state.points_inside(),
            total_requested: state.total_requested(),
        }
    }

    fn failed(message: &str, state: &RunningState) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::from_state(Phase::Failed, state)
        }
    }
}

struct ActiveRun {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Drives estimation runs against a [`FrameSource`].
pub struct StreamConsumer<S> {
    source: Arc<S>,
    snapshot: Arc<watch::Sender<ConsumerSnapshot>>,
    active: Option<ActiveRun>,
}

impl<S: FrameSource + 'static> StreamConsumer<S> {
    /// An idle consumer.
    pub fn new(source: S) -> Self {
        let (snapshot, _) = watch::channel(ConsumerSnapshot::default());
        Self {
            source: Arc::new(source),
            snapshot: Arc::new(snapshot),
            active: None,
        }
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ConsumerSnapshot> {
        self.snapshot.subscribe()
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> ConsumerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Whether a run is still in progress: started, not yet finished on its
    /// own, and not waited on or cancelled.
    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|run| !run.task.is_finished())
    }

    /// Start estimating with `n` points.
    ///
    /// Any previous run is cancelled first and its connection released
    /// before the new one opens. `n <= 0` resets to an idle, zero snapshot
    /// without connecting.
    pub async fn request(&mut self, n: i64) {
        self.stop().await;

        let Some(total) = u64::try_from(n).ok().filter(|&n| n > 0) else {
            tracing::debug!(n, "non-positive point count, staying idle");
            self.snapshot.send_replace(ConsumerSnapshot::default());
            return;
        };

        self.snapshot.send_replace(ConsumerSnapshot::connecting(total));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(
            Arc::clone(&self.source),
            Arc::clone(&self.snapshot),
            total,
            cancel.clone(),
        ));
        self.active = Some(ActiveRun { cancel, task });
    }

    /// Cancel the active run, if any. The estimate so far is kept; the phase
    /// drops back to [`Phase::Idle`] unless the run had already finished.
    pub async fn cancel(&mut self) {
        if self.stop().await {
            self.snapshot.send_modify(|snap| {
                if !snap.phase.is_terminal() {
                    snap.phase = Phase::Idle;
                }
                snap.is_loading = false;
            });
        }
    }

    /// Wait for the active run to finish on its own and return the final
    /// snapshot.
    pub async fn wait(&mut self) -> ConsumerSnapshot {
        if let Some(run) = self.active.take() {
            join(run.task).await;
        }
        self.snapshot()
    }

    async fn stop(&mut self) -> bool {
        let Some(run) = self.active.take() else {
            return false;
        };
        run.cancel.cancel();
        join(run.task).await;
        true
    }
}

impl<S> Drop for StreamConsumer<S> {
    fn drop(&mut self) {
        if let Some(run) = self.active.take() {
            run.cancel.cancel();
            run.task.abort();
        }
    }
}

async fn join(task: JoinHandle<()>) {
    if let Err(e) = task.await {
        if e.is_panic() {
            tracing::error!(error = %e, "estimation run panicked");
        }
    }
}

async fn run<S: FrameSource>(
    source: Arc<S>,
    snapshot: Arc<watch::Sender<ConsumerSnapshot>>,
    total: u64,
    cancel: CancellationToken,
) {
    let mut state = RunningState::new(total);

    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        opened = source.open(total) => opened,
    };
    let mut frames = match opened {
        Ok(frames) => frames,
        Err(e) => {
            tracing::warn!(error = %e, total, "failed to open point stream");
            snapshot.send_replace(ConsumerSnapshot::failed(CONNECT_FAILED_MESSAGE, &state));
            return;
        }
    };
    snapshot.send_replace(ConsumerSnapshot::from_state(Phase::Streaming, &state));

    let outcome = consume(&mut frames, &mut state, &snapshot, &cancel).await;
    drop(frames);

    match outcome {
        Outcome::Completed => {
            tracing::debug!(
                points_seen = state.points_seen(),
                chunks = state.chunks(),
                estimate = state.estimate(),
                "point stream completed"
            );
            snapshot.send_replace(ConsumerSnapshot::from_state(Phase::Completed, &state));
        }
        Outcome::Failed(e) => {
            tracing::warn!(error = %e, points_seen = state.points_seen(), "point stream failed");
            snapshot.send_replace(ConsumerSnapshot::failed(STREAM_FAILED_MESSAGE, &state));
        }
        Outcome::Cancelled => tracing::debug!("point stream cancelled"),
    }
}

enum Outcome {
    Completed,
    Failed(TransportError),
    Cancelled,
}

async fn consume(
    frames: &mut FrameStream,
    state: &mut RunningState,
    snapshot: &watch::Sender<ConsumerSnapshot>,
    cancel: &CancellationToken,
) -> Outcome {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Outcome::Cancelled,
            event = frames.receiver.next() => event,
        };

        match event {
            Some(FrameEvent::Frame(Frame::Chunk(payload))) => {
                let candidates = match decode_chunk(&payload) {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping undecodable chunk");
                        continue;
                    }
                };
                let summary = state.absorb(&candidates);
                for (index, reason) in &summary.rejected {
                    tracing::warn!(index, %reason, "skipping invalid point");
                }
                tracing::debug!(
                    chunk = state.chunks(),
                    accepted = summary.accepted,
                    inside = summary.inside,
                    "chunk absorbed"
                );
                snapshot.send_replace(ConsumerSnapshot::from_state(Phase::Streaming, state));
            }
            Some(FrameEvent::Frame(Frame::Done)) => return Outcome::Completed,
            Some(FrameEvent::Malformed(e)) => {
                tracing::warn!(error = %e, "skipping malformed frame");
            }
            Some(FrameEvent::Error(e)) => return Outcome::Failed(e),
            None => return Outcome::Failed(TransportError::Incomplete),
        }
    }
}

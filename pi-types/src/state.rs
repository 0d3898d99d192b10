//! The consumer-owned running tally.

use crate::error::PointShapeError;
use crate::estimator::ratio;
use crate::point::PointCandidate;

/// Running tally for one estimation request.
///
/// Owned by exactly one consumer run and mutated once per chunk. The
/// estimate is always recomputed from the counters, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningState {
    points_inside: u64,
    points_seen: u64,
    chunks: u64,
    total_requested: u64,
}

/// What absorbing one chunk did to the tally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkSummary {
    /// Valid points counted from this chunk.
    pub accepted: u64,
    /// Of those, how many fell inside the circle.
    pub inside: u64,
    /// Skipped points: position within the chunk and the reason.
    pub rejected: Vec<(usize, PointShapeError)>,
}

impl RunningState {
    /// A fresh tally for a request of `total_requested` points.
    #[must_use]
    pub fn new(total_requested: u64) -> Self {
        Self {
            total_requested,
            ..Self::default()
        }
    }

    /// Fold one decoded chunk into the tally.
    ///
    /// Shape-invalid points are skipped and reported in the summary; they
    /// neither count toward the inside tally nor abort the chunk.
    pub fn absorb(&mut self, chunk: &[PointCandidate]) -> ChunkSummary {
        let mut summary = ChunkSummary::default();
        for (index, candidate) in chunk.iter().enumerate() {
            match candidate.validate() {
                Ok(point) => {
                    summary.accepted += 1;
                    if point.is_inside_unit_circle() {
                        summary.inside += 1;
                    }
                }
                Err(reason) => summary.rejected.push((index, reason)),
            }
        }
        self.points_seen += summary.accepted;
        self.points_inside += summary.inside;
        self.chunks += 1;
        summary
    }

    /// `4 * points_inside / total_requested`.
    #[must_use]
    pub fn estimate(&self) -> f64 {
        ratio(self.points_inside, self.total_requested)
    }

    /// Valid points that fell inside the circle so far.
    #[must_use]
    pub fn points_inside(&self) -> u64 {
        self.points_inside
    }

    /// Valid points counted so far.
    #[must_use]
    pub fn points_seen(&self) -> u64 {
        self.points_seen
    }

    /// Chunks absorbed so far, including ones whose points were all rejected.
    #[must_use]
    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    /// The `n` this tally was opened for.
    #[must_use]
    pub fn total_requested(&self) -> u64 {
        self.total_requested
    }
}

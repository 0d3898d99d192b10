#![deny(missing_docs)]
//! # pi-types: shared vocabulary for streaming Monte Carlo estimation of π
//!
//! Every other crate in the workspace speaks in these types:
//!
//! | Type | What it is |
//! |------|-----------|
//! | [`Point`] | One sample, both coordinates drawn from `[0, 1)` |
//! | [`Chunk`] | A bounded batch of points sent as one wire unit |
//! | [`PointCandidate`] | A point as it arrived off the wire, not yet shape-checked |
//! | [`RunningState`] | The consumer's tally of inside-circle points |
//!
//! The estimator itself is a pure function, [`estimate`]: given points and a
//! caller-supplied total it returns `4 * inside / total`, or exactly `0.0`
//! when the total is zero.

pub mod error;
pub mod estimator;
pub mod point;
pub mod state;

pub use error::{EstimateError, FrameDecodeError, PointShapeError};
pub use estimator::{count_inside, estimate, estimate_candidates, ratio};
pub use point::{Chunk, Point, PointCandidate};
pub use state::{ChunkSummary, RunningState};

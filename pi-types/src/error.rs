//! Error types shared across the estimation pipeline.
//!
//! The per-frame and per-point errors are recoverable: a consumer logs them
//! and keeps estimating from whatever valid data remains.

use thiserror::Error;

/// A point that does not carry two numeric coordinates.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointShapeError {
    /// The value is not a JSON object at all.
    #[error("point is not an object: {0}")]
    NotAnObject(String),

    /// A coordinate field is missing.
    #[error("point is missing field '{0}'")]
    MissingField(&'static str),

    /// A coordinate field is present but not a number.
    #[error("field '{field}' is not numeric: {found}")]
    NotNumeric {
        /// Which coordinate.
        field: &'static str,
        /// The offending JSON, rendered.
        found: String,
    },

    /// A coordinate is NaN or infinite.
    #[error("field '{0}' is not finite")]
    NotFinite(&'static str),
}

/// A single frame payload that could not be decoded into a chunk.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FrameDecodeError {
    /// The payload is not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is JSON but not an array of points.
    #[error("frame is not an array: {0}")]
    NotAnArray(String),

    /// The frame bytes are not valid UTF-8.
    #[error("frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The byte stream ended partway through a frame.
    #[error("stream ended inside an unterminated frame ({0} bytes pending)")]
    Truncated(usize),
}

/// Errors from the estimator when handed shape-invalid input.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// The point at `index` failed shape validation.
    #[error("invalid point at index {index}: {source}")]
    InvalidPoint {
        /// Position of the offending point in the input.
        index: usize,
        /// Why it was rejected.
        #[source]
        source: PointShapeError,
    },
}

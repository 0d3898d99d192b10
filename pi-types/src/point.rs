//! Sampled points, as produced and as received.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PointShapeError;

/// One Monte Carlo sample.
///
/// Producers draw both coordinates independently and uniformly from `[0, 1)`.
/// The type itself does not enforce the range: stubbed sources in tests feed
/// points outside it to exercise the outside-circle branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// A bounded batch of points transmitted as one wire unit.
pub type Chunk = Vec<Point>;

impl Point {
    /// Create a point from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether `x² + y² ≤ 1`.
    #[must_use]
    pub fn is_inside_unit_circle(&self) -> bool {
        self.x * self.x + self.y * self.y <= 1.0
    }
}

/// A point exactly as it arrived in a decoded frame.
///
/// Remote data is untrusted, so the JSON value is kept as-is until
/// [`PointCandidate::validate`] checks that both coordinates are numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointCandidate(Value);

impl PointCandidate {
    /// Wrap a raw JSON value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The raw JSON value.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Check the shape and extract a typed [`Point`].
    pub fn validate(&self) -> Result<Point, PointShapeError> {
        let obj = self
            .0
            .as_object()
            .ok_or_else(|| PointShapeError::NotAnObject(self.0.to_string()))?;
        Ok(Point {
            x: coordinate(obj, "x")?,
            y: coordinate(obj, "y")?,
        })
    }
}

impl From<Point> for PointCandidate {
    fn from(point: Point) -> Self {
        Self(serde_json::json!({ "x": point.x, "y": point.y }))
    }
}

fn coordinate(obj: &Map<String, Value>, field: &'static str) -> Result<f64, PointShapeError> {
    let value = obj
        .get(field)
        .ok_or(PointShapeError::MissingField(field))?;
    let n = value.as_f64().ok_or_else(|| PointShapeError::NotNumeric {
        field,
        found: value.to_string(),
    })?;
    if !n.is_finite() {
        return Err(PointShapeError::NotFinite(field));
    }
    Ok(n)
}

//! The Monte Carlo estimator.
//!
//! Pure functions only. The ratio always uses the caller-supplied `total`,
//! which may differ from the number of points passed in (a consumer that has
//! received half the stream still divides by the requested total).

use crate::error::EstimateError;
use crate::point::{Point, PointCandidate};

/// Number of points with `x² + y² ≤ 1`.
#[must_use]
pub fn count_inside(points: &[Point]) -> u64 {
    points.iter().filter(|p| p.is_inside_unit_circle()).count() as u64
}

/// `4 * inside / total`, or exactly `0.0` when `total` is zero.
#[must_use]
pub fn ratio(inside: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    4.0 * inside as f64 / total as f64
}

/// Estimate π from typed points against `total`.
///
/// ```
/// use pi_types::{estimate, Point};
///
/// let points = [
///     Point::new(0.5, 0.5),
///     Point::new(0.7, 0.7),
///     Point::new(-0.3, -0.4),
///     Point::new(1.2, 1.2),
/// ];
/// assert_eq!(estimate(&points, 4), 3.0);
/// assert_eq!(estimate(&[], 0), 0.0);
/// ```
#[must_use]
pub fn estimate(points: &[Point], total: u64) -> f64 {
    if total == 0 || points.is_empty() {
        return 0.0;
    }
    ratio(count_inside(points), total)
}

/// Estimate π from untrusted wire points.
///
/// Every candidate must validate; the first shape-invalid point fails the
/// whole call with its index rather than being silently coerced.
pub fn estimate_candidates(
    candidates: &[PointCandidate],
    total: u64,
) -> Result<f64, EstimateError> {
    let points = candidates
        .iter()
        .enumerate()
        .map(|(index, c)| {
            c.validate()
                .map_err(|source| EstimateError::InvalidPoint { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(estimate(&points, total))
}

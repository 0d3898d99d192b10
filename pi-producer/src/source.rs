//! Where points come from.

use std::sync::Arc;

use pi_types::{Chunk, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ProducerError;

/// A generator of sample points.
///
/// One source is created per request and owned by that request's stream.
pub trait PointSource: Send {
    /// Draw the next point.
    fn next_point(&mut self) -> Result<Point, ProducerError>;

    /// Draw `len` points as one chunk. Fails whole; never returns a short chunk.
    fn fill(&mut self, len: usize) -> Result<Chunk, ProducerError> {
        (0..len).map(|_| self.next_point()).collect()
    }
}

/// Builds a fresh [`PointSource`] for each request.
pub type SourceFactory = Arc<dyn Fn() -> Box<dyn PointSource> + Send + Sync>;

/// Uniform `[0, 1)` coordinates from a non-cryptographic PRNG.
#[derive(Debug)]
pub struct UniformSource {
    rng: StdRng,
}

impl UniformSource {
    /// Seed from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Factory handing each request its own source. With a seed, every
    /// request replays the same sequence.
    #[must_use]
    pub fn factory(seed: Option<u64>) -> SourceFactory {
        Arc::new(move || -> Box<dyn PointSource> {
            match seed {
                Some(seed) => Box::new(Self::seeded(seed)),
                None => Box::new(Self::from_os_rng()),
            }
        })
    }
}

impl PointSource for UniformSource {
    fn next_point(&mut self) -> Result<Point, ProducerError> {
        Ok(Point::new(self.rng.random(), self.rng.random()))
    }
}

/// Cycles through a fixed list of points. Used to stub generation.
#[derive(Debug, Clone)]
pub struct FixedSource {
    points: Vec<Point>,
    cursor: usize,
}

impl FixedSource {
    /// Replay `points` in order, wrapping around at the end.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self { points, cursor: 0 }
    }

    /// Factory handing each request a replay from the first point.
    #[must_use]
    pub fn factory(points: Vec<Point>) -> SourceFactory {
        Arc::new(move || -> Box<dyn PointSource> { Box::new(Self::new(points.clone())) })
    }
}

impl PointSource for FixedSource {
    fn next_point(&mut self) -> Result<Point, ProducerError> {
        if self.points.is_empty() {
            return Err(ProducerError::Generation(
                "fixed source has no points".into(),
            ));
        }
        let point = self.points[self.cursor];
        self.cursor = (self.cursor + 1) % self.points.len();
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_points_are_in_unit_square() {
        let mut src = UniformSource::from_os_rng();
        for p in src.fill(10_000).unwrap() {
            assert!((0.0..1.0).contains(&p.x), "x out of range: {}", p.x);
            assert!((0.0..1.0).contains(&p.y), "y out of range: {}", p.y);
        }
    }

    #[test]
    fn seeded_sources_agree() {
        let a = UniformSource::seeded(7).fill(50).unwrap();
        let b = UniformSource::seeded(7).fill(50).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seeded_factory_replays_per_request() {
        let factory = UniformSource::factory(Some(42));
        let a = factory().fill(5).unwrap();
        let b = factory().fill(5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fixed_source_cycles() {
        let mut src = FixedSource::new(vec![Point::new(0.1, 0.1), Point::new(0.9, 0.9)]);
        let pts = src.fill(3).unwrap();
        assert_eq!(pts[0], Point::new(0.1, 0.1));
        assert_eq!(pts[1], Point::new(0.9, 0.9));
        assert_eq!(pts[2], Point::new(0.1, 0.1));
    }

    #[test]
    fn empty_fixed_source_fails() {
        let mut src = FixedSource::new(vec![]);
        assert!(matches!(src.fill(1), Err(ProducerError::Generation(_))));
    }
}

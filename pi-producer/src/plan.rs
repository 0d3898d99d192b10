//! Partitioning `n` points into chunk lengths.

use crate::error::ProducerError;

/// Iterator over chunk lengths for one request.
///
/// Yields lengths in `1..=chunk_size` summing to exactly `total`; only the
/// last may be short. A zero total yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    remaining: u64,
    chunk_size: usize,
}

impl ChunkPlan {
    /// Plan `total` points in chunks of at most `chunk_size`.
    pub fn new(total: u64, chunk_size: usize) -> Result<Self, ProducerError> {
        if chunk_size == 0 {
            return Err(ProducerError::Setup("chunk size must be positive".into()));
        }
        Ok(Self {
            remaining: total,
            chunk_size,
        })
    }

    /// Chunks still to come.
    #[must_use]
    pub fn chunk_count(&self) -> u64 {
        self.remaining.div_ceil(self.chunk_size as u64)
    }
}

impl Iterator for ChunkPlan {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let len = self.remaining.min(self.chunk_size as u64);
        self.remaining -= len;
        // `len <= chunk_size`, which is a usize.
        Some(len as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_multiple_has_no_short_chunk() {
        let plan: Vec<_> = ChunkPlan::new(3000, 1000).unwrap().collect();
        assert_eq!(plan, vec![1000, 1000, 1000]);
    }

    #[test]
    fn remainder_goes_last() {
        let plan: Vec<_> = ChunkPlan::new(25, 10).unwrap().collect();
        assert_eq!(plan, vec![10, 10, 5]);
    }

    #[test]
    fn fewer_points_than_chunk_size() {
        let plan: Vec<_> = ChunkPlan::new(4, 1000).unwrap().collect();
        assert_eq!(plan, vec![4]);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            ChunkPlan::new(10, 0),
            Err(ProducerError::Setup(_))
        ));
    }

    #[test]
    fn chunk_count_matches_iteration() {
        let plan = ChunkPlan::new(2501, 1000).unwrap();
        assert_eq!(plan.chunk_count(), 3);
        assert_eq!(plan.count(), 3);
    }

    proptest! {
        #[test]
        fn lengths_sum_to_total(total in 0u64..50_000, chunk_size in 1usize..2_000) {
            let lens: Vec<usize> = ChunkPlan::new(total, chunk_size).unwrap().collect();
            prop_assert_eq!(lens.iter().map(|&l| l as u64).sum::<u64>(), total);
            prop_assert!(lens.iter().all(|&l| l >= 1 && l <= chunk_size));
            if let Some((_, init)) = lens.split_last() {
                prop_assert!(init.iter().all(|&l| l == chunk_size));
            }
        }
    }
}

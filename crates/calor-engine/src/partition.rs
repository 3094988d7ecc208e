//! Row partitioning for the worker pool.
//!
//! Rows are dealt out in contiguous bands whose sizes differ by at most
//! one: worker `i` starts at `i * (rows / workers) + min(i, rows % workers)`,
//! so the first `rows % workers` workers carry one extra row. The union of
//! all bands covers every row exactly once — including the border rows,
//! which their owner merely copies forward.

use smallvec::SmallVec;

/// A contiguous, half-open range of rows `[start, end)` owned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowRange {
    /// First row of the band.
    pub start: usize,
    /// One past the last row of the band.
    pub end: usize,
}

impl RowRange {
    /// Number of rows in the band.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the band holds no rows.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `row` falls inside the band.
    pub fn contains(&self, row: usize) -> bool {
        row >= self.start && row < self.end
    }
}

fn band_start(row_count: usize, worker_count: usize, index: usize) -> usize {
    index * (row_count / worker_count) + index.min(row_count % worker_count)
}

/// The band assigned to worker `index` out of `worker_count`.
///
/// Requires `1 <= worker_count <= row_count` and `index < worker_count`;
/// use [`clamp_worker_count`] first so no band comes out empty.
pub fn range_for(row_count: usize, worker_count: usize, index: usize) -> RowRange {
    debug_assert!(worker_count >= 1);
    debug_assert!(worker_count <= row_count);
    debug_assert!(index < worker_count);
    RowRange {
        start: band_start(row_count, worker_count, index),
        end: band_start(row_count, worker_count, index + 1),
    }
}

/// All bands for a pool of `worker_count` workers, in worker order.
pub fn partition(row_count: usize, worker_count: usize) -> SmallVec<[RowRange; 8]> {
    (0..worker_count)
        .map(|index| range_for(row_count, worker_count, index))
        .collect()
}

/// Clamp a requested pool size so every worker owns at least one row.
pub fn clamp_worker_count(requested: usize, row_count: usize) -> usize {
    requested.clamp(1, row_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn remainder_rows_go_to_the_first_workers() {
        let bands = partition(10, 3);
        assert_eq!(
            bands.as_slice(),
            &[
                RowRange { start: 0, end: 4 },
                RowRange { start: 4, end: 7 },
                RowRange { start: 7, end: 10 },
            ]
        );
    }

    #[test]
    fn even_division_yields_equal_bands() {
        let bands = partition(12, 4);
        for (i, band) in bands.iter().enumerate() {
            assert_eq!(band.len(), 3, "band {i}");
        }
    }

    #[test]
    fn single_worker_owns_everything() {
        let bands = partition(7, 1);
        assert_eq!(bands.as_slice(), &[RowRange { start: 0, end: 7 }]);
    }

    #[test]
    fn one_row_per_worker_at_the_limit() {
        let bands = partition(5, 5);
        for (i, band) in bands.iter().enumerate() {
            assert_eq!(*band, RowRange { start: i, end: i + 1 });
        }
    }

    #[test]
    fn clamping_bounds_the_pool() {
        assert_eq!(clamp_worker_count(0, 10), 1);
        assert_eq!(clamp_worker_count(4, 10), 4);
        assert_eq!(clamp_worker_count(64, 10), 10);
    }

    proptest! {
        #[test]
        fn bands_cover_every_row_exactly_once(
            row_count in 3usize..200,
            worker_seed in 1usize..200,
        ) {
            let worker_count = clamp_worker_count(worker_seed, row_count);
            let bands = partition(row_count, worker_count);

            prop_assert_eq!(bands.len(), worker_count);
            prop_assert_eq!(bands[0].start, 0);
            prop_assert_eq!(bands[worker_count - 1].end, row_count);
            for pair in bands.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
        }

        #[test]
        fn band_sizes_spread_at_most_one(
            row_count in 3usize..200,
            worker_seed in 1usize..200,
        ) {
            let worker_count = clamp_worker_count(worker_seed, row_count);
            let bands = partition(row_count, worker_count);
            let min = bands.iter().map(RowRange::len).min().unwrap();
            let max = bands.iter().map(RowRange::len).max().unwrap();
            prop_assert!(min >= 1);
            prop_assert!(max - min <= 1);
        }
    }
}

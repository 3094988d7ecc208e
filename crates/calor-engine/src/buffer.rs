//! Double-buffered grid storage with ping-pong role flipping.
//!
//! [`GridBuffers`] holds the two cell buffers a run alternates between.
//! At any instant one side is the *read* buffer (frozen for the sweep)
//! and the other is the *write* buffer being filled; swapping roles is a
//! side-index flip on the coordinator, never a copy.
//!
//! This is the only module in the crate that uses `unsafe`. The access
//! methods are safe `fn`s with a logical contract (crate-internal callers
//! only), mirroring how the sweep protocol is enforced elsewhere:
//!
//! 1. Within one sweep, `read_side(s)` is called only for the side the
//!    coordinator designated as frozen, and `write_band(1 - s, band)` is
//!    called with pairwise-disjoint bands.
//! 2. Roles flip only between barriers, on the coordinator, after every
//!    worker has reported — so no slice from sweep `k` outlives the flip.
//! 3. `into_grid` runs after the pool has been joined, when the `Arc` has
//!    a single owner again.

#![allow(unsafe_code)]

use std::cell::UnsafeCell;

use calor_core::Grid;

use crate::partition::RowRange;

/// The two flat cell buffers of an active run.
///
/// Side 0 starts as the read buffer, seeded from the loaded grid; side 1
/// starts zeroed and is fully written by the first sweep (every row of
/// every band is either recomputed or border-copied).
pub(crate) struct GridBuffers {
    rows: usize,
    cols: usize,
    sides: [Box<[UnsafeCell<f64>]>; 2],
}

// SAFETY: shared mutation is partitioned by the sweep protocol described
// in the module docs — one frozen read side, pairwise-disjoint write
// bands on the other side, role flips gated by the report barrier.
unsafe impl Sync for GridBuffers {}

impl GridBuffers {
    pub(crate) fn new(initial: &Grid) -> Self {
        let read: Box<[UnsafeCell<f64>]> =
            initial.cells().iter().copied().map(UnsafeCell::new).collect();
        let write: Box<[UnsafeCell<f64>]> =
            (0..initial.cells().len()).map(|_| UnsafeCell::new(0.0)).collect();
        Self {
            rows: initial.rows(),
            cols: initial.cols(),
            sides: [read, write],
        }
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    /// The full cell buffer of `side`, for reading.
    ///
    /// Contract: `side` is the frozen side of the current sweep, so no
    /// writer touches it until the next role flip.
    pub(crate) fn read_side(&self, side: usize) -> &[f64] {
        let cells = &self.sides[side];
        // SAFETY: `UnsafeCell<f64>` is layout-identical to `f64`, and the
        // sweep protocol guarantees no concurrent writer on this side.
        unsafe { std::slice::from_raw_parts(cells.as_ptr().cast::<f64>(), cells.len()) }
    }

    /// The rows `band` of `side`, for writing.
    ///
    /// Contract: `side` is the write side of the current sweep and `band`
    /// is disjoint from every other band handed out for this sweep.
    #[allow(clippy::mut_from_ref)]
    pub(crate) fn write_band(&self, side: usize, band: RowRange) -> &mut [f64] {
        let start = band.start * self.cols;
        let len = band.len() * self.cols;
        let cells = &self.sides[side];
        debug_assert!(start + len <= cells.len());
        // SAFETY: bands are pairwise disjoint and nothing reads this side
        // until the coordinator flips roles at the barrier, so this is the
        // only live reference to these cells.
        unsafe {
            std::slice::from_raw_parts_mut(cells.as_ptr().add(start).cast::<f64>().cast_mut(), len)
        }
    }

    /// Reclaim one side as an owned [`Grid`].
    ///
    /// Consumes the buffers; callable once the pool has been joined and
    /// the coordinator is the sole owner.
    pub(crate) fn into_grid(self, side: usize) -> Grid {
        let [a, b] = self.sides;
        let chosen = if side == 0 { a } else { b };
        let cells: Vec<f64> = chosen.into_vec().into_iter().map(UnsafeCell::into_inner).collect();
        Grid::from_flat(self.rows, self.cols, cells)
            .expect("relaxation preserves grid shape and finiteness")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calor_core::Grid;

    fn grid() -> Grid {
        Grid::from_rows(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ])
        .unwrap()
    }

    #[test]
    fn side_zero_is_seeded_and_side_one_is_zeroed() {
        let buffers = GridBuffers::new(&grid());
        assert_eq!(buffers.read_side(0), grid().cells());
        assert_eq!(buffers.read_side(1), &[0.0; 9]);
    }

    #[test]
    fn write_band_addresses_whole_rows() {
        let buffers = GridBuffers::new(&grid());
        let band = buffers.write_band(1, RowRange { start: 1, end: 3 });
        assert_eq!(band.len(), 6);
        band.copy_from_slice(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        assert_eq!(
            buffers.read_side(1),
            &[0.0, 0.0, 0.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0]
        );
    }

    #[test]
    fn into_grid_returns_the_chosen_side() {
        let buffers = GridBuffers::new(&grid());
        let band = buffers.write_band(1, RowRange { start: 0, end: 3 });
        for (i, cell) in band.iter_mut().enumerate() {
            *cell = i as f64;
        }
        let reclaimed = buffers.into_grid(1);
        let expected: Vec<f64> = (0..9).map(f64::from).collect();
        assert_eq!(reclaimed.cells(), expected.as_slice());
    }
}

//! Test fixtures for calor development.
//!
//! Provides ready-made grids (uniform, hot-top boundary, seeded random)
//! and [`relax_serial`], a single-threaded reference relaxation used to
//! cross-check the concurrent engine bit-for-bit.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use calor_core::Grid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A `rows`×`cols` grid with every cell set to `value`.
///
/// # Panics
///
/// Panics below the 3×3 minimum — fixtures are for tests, where that is
/// a bug in the test itself.
pub fn uniform(rows: usize, cols: usize, value: f64) -> Grid {
    Grid::filled(rows, cols, value).expect("fixture dimensions must be valid")
}

/// A grid whose top row is held at `top` and every other cell at `rest`.
///
/// This is the classic hot-plate boundary condition: the interior relaxes
/// towards the discrete Laplace solution for the fixed top edge.
pub fn hot_top(rows: usize, cols: usize, top: f64, rest: f64) -> Grid {
    let mut cells = vec![rest; rows * cols];
    for cell in cells.iter_mut().take(cols) {
        *cell = top;
    }
    Grid::from_flat(rows, cols, cells).expect("fixture dimensions must be valid")
}

/// A reproducible random grid with cells drawn uniformly from `0..100`.
///
/// Seeded with ChaCha8 so the same seed always yields the same grid,
/// which keeps determinism tests meaningful across machines.
pub fn random_grid(rows: usize, cols: usize, seed: u64) -> Grid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cells: Vec<f64> = (0..rows * cols)
        .map(|_| rng.random_range(0.0..100.0))
        .collect();
    Grid::from_flat(rows, cols, cells).expect("fixture dimensions must be valid")
}

/// Single-threaded reference relaxation.
///
/// Repeats the Jacobi sweep — border cells copied forward, interior cells
/// replaced by the mean of their four orthogonal neighbours from the
/// previous sweep — until no interior cell moves by more than `epsilon`.
/// Returns the settled grid and the number of sweeps performed.
///
/// The stencil is evaluated as `(up + down + left + right) / 4.0`, the
/// exact expression the concurrent engine uses, so results are comparable
/// bit-for-bit.
pub fn relax_serial(grid: &Grid, epsilon: f64) -> (Grid, u64) {
    let rows = grid.rows();
    let cols = grid.cols();
    let mut prev: Vec<f64> = grid.cells().to_vec();
    let mut next = vec![0.0; rows * cols];
    let mut sweeps = 0u64;
    loop {
        let mut settled = true;
        for row in 0..rows {
            for col in 0..cols {
                let i = row * cols + col;
                if row == 0 || row == rows - 1 || col == 0 || col == cols - 1 {
                    next[i] = prev[i];
                } else {
                    let mean = (prev[i - cols] + prev[i + cols] + prev[i - 1] + prev[i + 1]) / 4.0;
                    if (mean - prev[i]).abs() > epsilon {
                        settled = false;
                    }
                    next[i] = mean;
                }
            }
        }
        sweeps += 1;
        std::mem::swap(&mut prev, &mut next);
        if settled {
            break;
        }
    }
    let grid = Grid::from_flat(rows, cols, prev).expect("relaxation preserves grid shape");
    (grid, sweeps)
}

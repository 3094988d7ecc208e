//! Settled-grid comparison against a reference file.

use calor_core::Grid;

/// Why a case's settled grid did not match its reference.
#[derive(Clone, Debug, PartialEq)]
pub enum CaseFailure {
    /// The grids disagree on shape.
    DimensionMismatch {
        /// Settled grid dimensions.
        actual: (usize, usize),
        /// Reference grid dimensions.
        expected: (usize, usize),
    },
    /// A cell differs by at least the tolerance.
    CellMismatch {
        /// Row of the first mismatch.
        row: usize,
        /// Column of the first mismatch.
        col: usize,
        /// Settled value.
        actual: f64,
        /// Reference value.
        expected: f64,
    },
}

impl std::fmt::Display for CaseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch { actual, expected } => write!(
                f,
                "settled grid is {}x{}, reference is {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            Self::CellMismatch {
                row,
                col,
                actual,
                expected,
            } => write!(
                f,
                "first mismatch at [{row}][{col}]: {actual} vs expected {expected}"
            ),
        }
    }
}

/// Compare the interior of `actual` against `expected`.
///
/// Border cells are the fixed boundary condition — the engine never
/// recomputes them — so only interior cells are diffed. Two cells match
/// when they differ by strictly less than `tolerance`.
pub fn compare_interior(actual: &Grid, expected: &Grid, tolerance: f64) -> Option<CaseFailure> {
    if actual.rows() != expected.rows() || actual.cols() != expected.cols() {
        return Some(CaseFailure::DimensionMismatch {
            actual: (actual.rows(), actual.cols()),
            expected: (expected.rows(), expected.cols()),
        });
    }
    for row in 1..actual.rows() - 1 {
        for col in 1..actual.cols() - 1 {
            let a = actual.row(row)[col];
            let e = expected.row(row)[col];
            if (a - e).abs() >= tolerance {
                return Some(CaseFailure::CellMismatch {
                    row,
                    col,
                    actual: a,
                    expected: e,
                });
            }
        }
    }
    None
}

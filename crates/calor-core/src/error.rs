//! Error types for grid construction and cell addressing.

use std::error::Error;
use std::fmt;

/// Errors detected while constructing a [`Grid`](crate::Grid).
///
/// Construction is all-or-nothing: a failed build leaves no partial grid
/// behind, so callers can surface these directly from their load paths.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// The input had no rows at all.
    Empty,
    /// The input is below the 3×3 minimum required for an interior.
    TooSmall {
        /// Number of rows provided.
        rows: usize,
        /// Number of columns provided.
        cols: usize,
    },
    /// A row's length differs from the first row's length.
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Length of the offending row.
        len: usize,
        /// Expected length (the first row's length).
        expected: usize,
    },
    /// A flat cell buffer does not match `rows * cols`.
    CellCountMismatch {
        /// Expected number of cells.
        expected: usize,
        /// Number of cells provided.
        actual: usize,
    },
    /// A cell holds NaN or an infinity.
    NonFiniteCell {
        /// Zero-based row of the offending cell.
        row: usize,
        /// Zero-based column of the offending cell.
        col: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "grid has no rows"),
            Self::TooSmall { rows, cols } => {
                write!(f, "grid is {rows}x{cols}, minimum is 3x3")
            }
            Self::RaggedRow { row, len, expected } => {
                write!(f, "row {row} has {len} cells, expected {expected}")
            }
            Self::CellCountMismatch { expected, actual } => {
                write!(f, "cell buffer holds {actual} values, expected {expected}")
            }
            Self::NonFiniteCell { row, col } => {
                write!(f, "cell [{row}][{col}] is not a finite number")
            }
        }
    }
}

impl Error for GridError {}

/// A cell address outside the grid's dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundsError {
    /// Requested row.
    pub row: usize,
    /// Requested column.
    pub col: usize,
    /// Number of rows in the grid.
    pub rows: usize,
    /// Number of columns in the grid.
    pub cols: usize,
}

impl fmt::Display for BoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cell [{}][{}] is outside the {}x{} grid",
            self.row, self.col, self.rows, self.cols
        )
    }
}

impl Error for BoundsError {}

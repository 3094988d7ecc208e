//! Error type for grid loading.

use std::error::Error;
use std::fmt;
use std::io;

use calor_core::GridError;

/// Errors while reading a grid from CSV.
#[derive(Debug)]
pub enum LoadError {
    /// The underlying reader failed.
    Io(io::Error),
    /// A field did not parse as a floating-point number.
    ///
    /// Malformed input is rejected outright, never read as zero.
    InvalidNumber {
        /// One-based line of the offending field.
        line: usize,
        /// One-based field position within the line.
        column: usize,
        /// The text that failed to parse.
        text: String,
    },
    /// The parsed rows do not form a valid grid.
    Grid(GridError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "read failed: {e}"),
            Self::InvalidNumber { line, column, text } => {
                write!(f, "line {line}, field {column}: '{text}' is not a number")
            }
            Self::Grid(e) => write!(f, "invalid grid: {e}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::InvalidNumber { .. } => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<GridError> for LoadError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

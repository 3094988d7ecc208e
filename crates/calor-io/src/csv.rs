//! CSV parsing for grids and reference-file tolerances.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use calor_core::Grid;

use crate::error::LoadError;

/// Read a grid from the CSV file at `path`.
///
/// # Errors
///
/// [`LoadError::Io`] when the file cannot be opened or read, otherwise
/// as [`parse_grid`].
pub fn read_grid<P: AsRef<Path>>(path: P) -> Result<Grid, LoadError> {
    let file = File::open(path)?;
    parse_grid(BufReader::new(file))
}

/// Parse a grid from comma-separated lines.
///
/// One row per line. Fields may carry surrounding whitespace; blank lines
/// are skipped; a single trailing comma per line is tolerated.
///
/// # Errors
///
/// [`LoadError::InvalidNumber`] with the line and field of the first
/// malformed value, or [`LoadError::Grid`] when the rows do not form a
/// rectangular, at-least-3×3, finite grid.
pub fn parse_grid<R: BufRead>(reader: R) -> Result<Grid, LoadError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut fields: Vec<&str> = trimmed.split(',').collect();
        if fields.len() > 1 && fields.last().is_some_and(|f| f.trim().is_empty()) {
            fields.pop();
        }
        let mut row = Vec::with_capacity(fields.len());
        for (field_index, field) in fields.iter().enumerate() {
            let text = field.trim();
            let value: f64 = text.parse().map_err(|_| LoadError::InvalidNumber {
                line: line_index + 1,
                column: field_index + 1,
                text: text.to_string(),
            })?;
            row.push(value);
        }
        rows.push(row);
    }
    Ok(Grid::from_rows(rows)?)
}

/// Read the comparison tolerance for the reference file at `path`.
///
/// # Errors
///
/// [`LoadError::Io`] when the file cannot be opened or read.
pub fn read_tolerance<P: AsRef<Path>>(path: P) -> Result<f64, LoadError> {
    let file = File::open(path)?;
    detect_tolerance(BufReader::new(file))
}

/// Derive a comparison tolerance from a reference file's first value.
///
/// The tolerance is one unit in the last decimal place of the first
/// field: `25.50` gives `0.01`, `100` gives `1.0`. Comparing settled
/// grids against a file that was written with two decimals cannot demand
/// more precision than those two decimals.
///
/// An empty file yields `1.0`.
///
/// # Errors
///
/// [`LoadError::Io`] when the reader fails.
pub fn detect_tolerance<R: BufRead>(reader: R) -> Result<f64, LoadError> {
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let first = trimmed.split(',').next().unwrap_or("").trim();
        let mut tolerance = 1.0_f64;
        let mut in_decimals = false;
        for ch in first.chars() {
            match ch {
                '.' => in_decimals = true,
                c if c.is_ascii_digit() && in_decimals => tolerance /= 10.0,
                _ => {}
            }
        }
        return Ok(tolerance);
    }
    Ok(1.0)
}

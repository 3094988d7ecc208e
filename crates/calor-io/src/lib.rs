//! CSV grid loading.
//!
//! Grids travel as plain comma-separated values: one row per line, one
//! floating-point number per field. [`read_grid`] and [`parse_grid`]
//! produce a validated [`Grid`](calor_core::Grid); [`read_tolerance`] /
//! [`detect_tolerance`]
//! derive a comparison tolerance from the decimal precision a reference
//! file was written with, so diffs demand no more precision than the file
//! itself carries.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod csv;
mod error;

pub use csv::{detect_tolerance, parse_grid, read_grid, read_tolerance};
pub use error::LoadError;

//! Core grid types for the calor heat-relaxation workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! [`Grid`], the validated rectangular temperature matrix shared by the
//! engine, the loader, and the verification harness, together with the
//! error types for grid construction and cell addressing.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod error;
mod grid;

pub use error::{BoundsError, GridError};
pub use grid::Grid;

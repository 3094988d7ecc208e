//! Calor: concurrent Jacobi heat-relaxation simulation.
//!
//! This is the top-level facade crate re-exporting the public API of the
//! calor sub-crates. For most users, adding `calor` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use calor::prelude::*;
//!
//! // A 5x5 plate with the top edge held at 100 degrees.
//! let mut rows = vec![vec![0.0; 5]; 5];
//! rows[0] = vec![100.0; 5];
//!
//! let mut sim = Simulation::new();
//! sim.set_epsilon(0.01).unwrap();
//! sim.load(Grid::from_rows(rows).unwrap());
//!
//! let report = sim.run().unwrap();
//! assert_eq!(report.outcome, Outcome::Converged);
//!
//! // The top border is untouched; the interior settled below it.
//! assert_eq!(sim.value_at(0, 2).unwrap(), 100.0);
//! assert!(sim.value_at(1, 2).unwrap() > 0.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`grid`] | `calor-core` | The validated `Grid` matrix and its errors |
//! | [`engine`] | `calor-engine` | `Simulation`, worker pool, partitioning, events |
//! | [`io`] | `calor-io` | CSV grid loading and tolerance detection |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// The validated grid matrix and its error types (`calor-core`).
pub use calor_core as grid;

/// The relaxation engine (`calor-engine`).
///
/// [`engine::Simulation`] is the coordinator: load a grid, set a
/// tolerance, run to convergence, query the settled values.
pub use calor_engine as engine;

/// CSV grid loading (`calor-io`).
pub use calor_io as io;

/// Common imports for typical calor usage.
///
/// ```rust
/// use calor::prelude::*;
/// ```
pub mod prelude {
    // Grid
    pub use calor_core::{BoundsError, Grid, GridError};

    // Engine
    pub use calor_engine::{
        CancelToken, EngineConfig, EngineError, Outcome, ParameterError, RowRange, RunHandle,
        RunReport, SimEvent, SimState, Simulation,
    };

    // IO
    pub use calor_io::{parse_grid, read_grid, read_tolerance, LoadError};
}

//! Error types for the relaxation engine.

use std::error::Error;
use std::fmt;

use calor_core::BoundsError;

/// Rejected tolerance values.
///
/// Surfaced by [`Simulation::set_epsilon`](crate::Simulation::set_epsilon)
/// before any sweep runs; the previous tolerance stays in effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterError {
    /// The tolerance was negative.
    NegativeEpsilon {
        /// The rejected value.
        value: f64,
    },
    /// The tolerance was NaN or infinite.
    NonFiniteEpsilon {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeEpsilon { value } => {
                write!(f, "epsilon must be non-negative, got {value}")
            }
            Self::NonFiniteEpsilon { value } => {
                write!(f, "epsilon must be finite, got {value}")
            }
        }
    }
}

impl Error for ParameterError {}

/// Errors from the simulation lifecycle and queries.
#[derive(Debug, PartialEq)]
pub enum EngineError {
    /// No grid has been loaded.
    NotLoaded,
    /// The previous run reached a terminal state; load a fresh grid first.
    AlreadyFinished,
    /// A cell query fell outside the grid.
    OutOfBounds(BoundsError),
    /// A worker thread died before the sweep completed.
    PoolDisconnected,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "no grid loaded"),
            Self::AlreadyFinished => {
                write!(f, "run already finished; load a fresh grid to run again")
            }
            Self::OutOfBounds(e) => write!(f, "{e}"),
            Self::PoolDisconnected => write!(f, "worker pool disconnected mid-sweep"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OutOfBounds(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BoundsError> for EngineError {
    fn from(e: BoundsError) -> Self {
        Self::OutOfBounds(e)
    }
}

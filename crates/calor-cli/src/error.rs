//! Error type for the verification harness.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use calor_engine::{EngineError, ParameterError};
use calor_io::LoadError;

/// Errors while discovering or running test cases.
#[derive(Debug)]
pub enum HarnessError {
    /// A test directory could not be listed.
    Directory {
        /// The directory that failed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// A grid or reference file could not be loaded.
    Load {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        source: LoadError,
    },
    /// An input file has no matching expected-output file.
    MissingExpected {
        /// The expected-output path that does not exist.
        path: PathBuf,
    },
    /// The engine rejected the case's tolerance.
    Parameter(ParameterError),
    /// The engine failed to run the case.
    Engine(EngineError),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory { path, source } => {
                write!(f, "cannot list {}: {source}", path.display())
            }
            Self::Load { path, source } => {
                write!(f, "cannot load {}: {source}", path.display())
            }
            Self::MissingExpected { path } => {
                write!(f, "missing expected output {}", path.display())
            }
            Self::Parameter(e) => write!(f, "{e}"),
            Self::Engine(e) => write!(f, "{e}"),
        }
    }
}

impl Error for HarnessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Directory { source, .. } => Some(source),
            Self::Load { source, .. } => Some(source),
            Self::Parameter(e) => Some(e),
            Self::Engine(e) => Some(e),
            Self::MissingExpected { .. } => None,
        }
    }
}

impl From<ParameterError> for HarnessError {
    fn from(e: ParameterError) -> Self {
        Self::Parameter(e)
    }
}

impl From<EngineError> for HarnessError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

//! Run outcome and summary metrics.

use std::time::Duration;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every interior cell settled within epsilon.
    Converged,
    /// Cancellation was requested and honoured.
    Cancelled,
}

/// Summary of one completed run.
///
/// Returned by [`Simulation::run`](crate::Simulation::run); the engine
/// keeps no logging of its own, so this is the observability surface.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Terminal state of the run.
    pub outcome: Outcome,
    /// Number of sweeps performed.
    pub iterations: u64,
    /// Size of the worker pool that ran the sweeps.
    pub workers: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

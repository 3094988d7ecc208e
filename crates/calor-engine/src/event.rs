//! Lifecycle events emitted while a run progresses.

/// A lifecycle notification from an active run.
///
/// Delivered best-effort on channels handed out by
/// [`Simulation::subscribe`](crate::Simulation::subscribe): presentation
/// layers redraw on `IterationCompleted` and stop polling on either
/// terminal event. Sweeps are counted from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimEvent {
    /// A sweep finished and the run continues.
    IterationCompleted {
        /// The sweep that just completed.
        iteration: u64,
    },
    /// The run settled: no interior cell moved by more than epsilon.
    Converged {
        /// Total sweeps performed.
        iterations: u64,
    },
    /// The run was cancelled before settling.
    Cancelled {
        /// Total sweeps performed, including the discarded one.
        iterations: u64,
    },
}

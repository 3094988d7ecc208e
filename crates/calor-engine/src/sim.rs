//! The simulation coordinator.
//!
//! [`Simulation`] owns the grid, the tolerance, and — during a run — the
//! worker pool and both buffers. It drives the broadcast/gather protocol:
//! fan an `Advance` out to every worker, wait for every report (the
//! barrier), AND the per-worker settled flags, flip the buffer roles, and
//! either loop, settle, or honour a cancellation.
//!
//! The barrier deliberately counts to the full pool size. Releasing it
//! one report early would let the role flip race the last worker's writes
//! and read a row that is still being filled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};

use calor_core::{BoundsError, Grid};

use crate::buffer::GridBuffers;
use crate::config::EngineConfig;
use crate::error::{EngineError, ParameterError};
use crate::event::SimEvent;
use crate::partition::partition;
use crate::report::{Outcome, RunReport};
use crate::worker::{RowWorker, WorkerCommand, WorkerReport};

// ── CancelToken ──────────────────────────────────────────────────

/// Cloneable handle requesting cooperative cancellation of a run.
///
/// Workers check the flag before each row and the coordinator checks it
/// after each barrier, so cancellation is honoured on the next row/sweep
/// boundary rather than immediately. Loading a fresh grid re-arms the
/// token.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }

    fn shared_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

// ── SimState ─────────────────────────────────────────────────────

/// Lifecycle state of a [`Simulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimState {
    /// No grid loaded yet.
    Idle,
    /// A grid is staged and a run may start.
    Loaded,
    /// A run ended; a fresh load is required before the next run.
    Finished(Outcome),
}

// ── Simulation ───────────────────────────────────────────────────

/// The relaxation coordinator.
///
/// Owns the grid and tolerance between runs and the double buffer plus
/// worker pool during one. See the crate docs for the sweep protocol.
///
/// ```
/// use calor_core::Grid;
/// use calor_engine::{Outcome, Simulation};
///
/// let mut sim = Simulation::new();
/// sim.set_epsilon(0.01)?;
/// sim.load(Grid::filled(4, 4, 20.0)?);
/// let report = sim.run()?;
/// assert_eq!(report.outcome, Outcome::Converged);
/// assert_eq!(sim.value_at(1, 1)?, 20.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Simulation {
    config: EngineConfig,
    epsilon: f64,
    grid: Option<Grid>,
    state: SimState,
    cancel: CancelToken,
    subscribers: Vec<Sender<SimEvent>>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// A simulation with default configuration and a zero tolerance.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// A simulation with explicit configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            epsilon: 0.0,
            grid: None,
            state: SimState::Idle,
            cancel: CancelToken::new(),
            subscribers: Vec::new(),
        }
    }

    /// Stage `grid` as the starting state and re-arm the simulation.
    ///
    /// Replaces whatever was loaded before, clears any pending
    /// cancellation request, and moves a finished simulation back to
    /// [`SimState::Loaded`]. Grid validation (rectangular, ≥ 3×3, finite)
    /// happens at [`Grid`] construction, so a grid that exists is loadable.
    pub fn load(&mut self, grid: Grid) {
        self.grid = Some(grid);
        self.state = SimState::Loaded;
        self.cancel.clear();
    }

    /// Set the convergence tolerance.
    ///
    /// # Errors
    ///
    /// [`ParameterError::NegativeEpsilon`] or
    /// [`ParameterError::NonFiniteEpsilon`]; the stored tolerance is left
    /// untouched on error.
    pub fn set_epsilon(&mut self, value: f64) -> Result<(), ParameterError> {
        if !value.is_finite() {
            return Err(ParameterError::NonFiniteEpsilon { value });
        }
        if value < 0.0 {
            return Err(ParameterError::NegativeEpsilon { value });
        }
        self.epsilon = value;
        Ok(())
    }

    /// The current convergence tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of rows of the loaded grid, if any.
    pub fn rows(&self) -> Option<usize> {
        self.grid.as_ref().map(Grid::rows)
    }

    /// Number of columns of the loaded grid, if any.
    pub fn cols(&self) -> Option<usize> {
        self.grid.as_ref().map(Grid::cols)
    }

    /// The lifecycle state.
    pub fn state(&self) -> SimState {
        self.state
    }

    /// The grid in its latest accepted state, if one is loaded.
    ///
    /// Before a run this is the loaded grid; after one it is the grid the
    /// last fully completed sweep produced.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Minimum and maximum cell values of the grid, scanned on each call.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotLoaded`] when no grid is present.
    pub fn compute_bounds(&self) -> Result<(f64, f64), EngineError> {
        self.grid
            .as_ref()
            .map(Grid::bounds)
            .ok_or(EngineError::NotLoaded)
    }

    /// The cell at `(row, col)` of the latest accepted grid.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotLoaded`] with no grid,
    /// [`EngineError::OutOfBounds`] outside the grid's dimensions.
    pub fn value_at(&self, row: usize, col: usize) -> Result<f64, EngineError> {
        let grid = self.grid.as_ref().ok_or(EngineError::NotLoaded)?;
        grid.get(row, col).ok_or_else(|| {
            EngineError::OutOfBounds(BoundsError {
                row,
                col,
                rows: grid.rows(),
                cols: grid.cols(),
            })
        })
    }

    /// Request cooperative cancellation of the current or next run.
    ///
    /// Equivalent to triggering [`cancel_token`](Self::cancel_token);
    /// cleared by the next [`load`](Self::load).
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels the current or next run when triggered.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Subscribe to lifecycle events.
    ///
    /// Events are delivered best-effort on an unbounded channel; dropped
    /// receivers are pruned on the next send. Subscribe before
    /// [`run_detached`](Self::run_detached) — the simulation moves onto
    /// the coordinator thread.
    pub fn subscribe(&mut self) -> Receiver<SimEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Run the relaxation to a terminal state, blocking the caller.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotLoaded`] without a staged grid,
    /// [`EngineError::AlreadyFinished`] after a terminal run without a
    /// fresh [`load`](Self::load), and [`EngineError::PoolDisconnected`]
    /// if a worker thread dies (the grid is lost and the simulation
    /// returns to idle).
    pub fn run(&mut self) -> Result<RunReport, EngineError> {
        match self.state {
            SimState::Finished(_) => return Err(EngineError::AlreadyFinished),
            SimState::Idle => return Err(EngineError::NotLoaded),
            SimState::Loaded => {}
        }
        let grid = self.grid.take().ok_or(EngineError::NotLoaded)?;
        let started = Instant::now();
        match self.relax(grid) {
            Ok((grid, outcome, iterations, workers)) => {
                self.grid = Some(grid);
                self.state = SimState::Finished(outcome);
                self.emit(match outcome {
                    Outcome::Converged => SimEvent::Converged { iterations },
                    Outcome::Cancelled => SimEvent::Cancelled { iterations },
                });
                Ok(RunReport {
                    outcome,
                    iterations,
                    workers,
                    elapsed: started.elapsed(),
                })
            }
            Err(e) => {
                self.state = SimState::Idle;
                Err(e)
            }
        }
    }

    /// Run on a dedicated coordinator thread, returning immediately.
    ///
    /// The simulation moves onto the thread and comes back from
    /// [`RunHandle::join`] in its terminal state. Event receivers from
    /// [`subscribe`](Self::subscribe) keep working across the move.
    ///
    /// # Errors
    ///
    /// Same readiness errors as [`run`](Self::run), reported
    /// synchronously before any thread is spawned.
    pub fn run_detached(mut self) -> Result<RunHandle, EngineError> {
        match self.state {
            SimState::Finished(_) => return Err(EngineError::AlreadyFinished),
            SimState::Idle => return Err(EngineError::NotLoaded),
            SimState::Loaded => {}
        }
        let cancel = self.cancel.clone();
        let thread = thread::Builder::new()
            .name("calor-sim".into())
            .spawn(move || {
                let report = self.run();
                (self, report)
            })
            .expect("failed to spawn coordinator thread");
        Ok(RunHandle { cancel, thread })
    }

    /// The broadcast/gather loop: returns the accepted grid, the outcome,
    /// the sweep count, and the pool size.
    fn relax(&mut self, grid: Grid) -> Result<(Grid, Outcome, u64, usize), EngineError> {
        let workers = self.config.resolved_worker_count(grid.rows());
        let bands = partition(grid.rows(), workers);
        let buffers = Arc::new(GridBuffers::new(&grid));

        let (report_tx, report_rx) = crossbeam_channel::bounded::<WorkerReport>(workers);
        let mut commands = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for (index, band) in bands.iter().copied().enumerate() {
            let (tx, rx) = crossbeam_channel::bounded(1);
            let unit = RowWorker {
                index,
                band,
                epsilon: self.epsilon,
                buffers: Arc::clone(&buffers),
                cancel: self.cancel.shared_flag(),
            };
            let reports = report_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("calor-worker-{index}"))
                .spawn(move || unit.run(rx, reports))
                .expect("failed to spawn relaxation worker");
            commands.push(tx);
            handles.push(handle);
        }
        drop(report_tx);

        // `read_side` is the frozen buffer of the upcoming sweep; the
        // accepted grid always lives there between sweeps.
        let mut read_side = 0;
        let mut iterations = 0u64;
        let outcome = loop {
            let broadcast_ok = commands
                .iter()
                .all(|tx| tx.send(WorkerCommand::Advance { read_side }).is_ok());
            if !broadcast_ok {
                Self::teardown(commands, handles);
                return Err(EngineError::PoolDisconnected);
            }

            // Barrier: one report from every worker, with the settled
            // flags folded fresh each sweep.
            let mut settled = true;
            for _ in 0..workers {
                match report_rx.recv() {
                    Ok(report) => settled &= report.settled,
                    Err(_) => {
                        Self::teardown(commands, handles);
                        return Err(EngineError::PoolDisconnected);
                    }
                }
            }
            iterations += 1;

            if self.cancel.is_cancelled() {
                // The sweep may have been cut short on a row boundary, so
                // the write side is not accepted; the last fully completed
                // sweep stays on `read_side`.
                break Outcome::Cancelled;
            }
            if settled {
                read_side = 1 - read_side;
                break Outcome::Converged;
            }
            read_side = 1 - read_side;
            self.emit(SimEvent::IterationCompleted {
                iteration: iterations,
            });
        };

        Self::teardown(commands, handles);
        let buffers = match Arc::try_unwrap(buffers) {
            Ok(buffers) => buffers,
            Err(_) => return Err(EngineError::PoolDisconnected),
        };
        Ok((buffers.into_grid(read_side), outcome, iterations, workers))
    }

    fn teardown(commands: Vec<Sender<WorkerCommand>>, handles: Vec<JoinHandle<()>>) {
        for tx in &commands {
            let _ = tx.send(WorkerCommand::Halt);
        }
        drop(commands);
        for handle in handles {
            let _ = handle.join();
        }
    }

    fn emit(&mut self, event: SimEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

// ── RunHandle ────────────────────────────────────────────────────

/// Handle to a run started with [`Simulation::run_detached`].
#[derive(Debug)]
pub struct RunHandle {
    cancel: CancelToken,
    thread: JoinHandle<(Simulation, Result<RunReport, EngineError>)>,
}

impl RunHandle {
    /// Request cooperative cancellation of the running simulation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A cancel token for the running simulation.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the run to end, returning the simulation in its terminal
    /// state together with the run result.
    pub fn join(self) -> (Simulation, Result<RunReport, EngineError>) {
        self.thread.join().expect("coordinator thread panicked")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_3x3(center: f64) -> Grid {
        Grid::from_rows(vec![
            vec![4.0, 8.0, 4.0],
            vec![0.0, center, 8.0],
            vec![4.0, 0.0, 4.0],
        ])
        .unwrap()
    }

    #[test]
    fn run_without_load_is_rejected() {
        let mut sim = Simulation::new();
        assert_eq!(sim.run().unwrap_err(), EngineError::NotLoaded);
        assert_eq!(sim.state(), SimState::Idle);
    }

    #[test]
    fn epsilon_validation() {
        let mut sim = Simulation::new();
        sim.set_epsilon(0.25).unwrap();
        assert_eq!(sim.epsilon(), 0.25);

        assert_eq!(
            sim.set_epsilon(-1.0),
            Err(ParameterError::NegativeEpsilon { value: -1.0 })
        );
        assert!(matches!(
            sim.set_epsilon(f64::NAN),
            Err(ParameterError::NonFiniteEpsilon { .. })
        ));
        assert!(matches!(
            sim.set_epsilon(f64::INFINITY),
            Err(ParameterError::NonFiniteEpsilon { .. })
        ));
        // Rejected values leave the stored tolerance untouched.
        assert_eq!(sim.epsilon(), 0.25);
    }

    #[test]
    fn queries_before_load_fail() {
        let sim = Simulation::new();
        assert_eq!(sim.compute_bounds().unwrap_err(), EngineError::NotLoaded);
        assert_eq!(sim.value_at(0, 0).unwrap_err(), EngineError::NotLoaded);
        assert_eq!(sim.rows(), None);
        assert_eq!(sim.cols(), None);
    }

    #[test]
    fn value_at_checks_bounds() {
        let mut sim = Simulation::new();
        sim.load(grid_3x3(4.0));
        assert_eq!(sim.value_at(1, 1), Ok(4.0));
        assert_eq!(
            sim.value_at(3, 0),
            Err(EngineError::OutOfBounds(BoundsError {
                row: 3,
                col: 0,
                rows: 3,
                cols: 3,
            }))
        );
    }

    #[test]
    fn compute_bounds_scans_the_grid() {
        let mut sim = Simulation::new();
        sim.load(grid_3x3(-2.0));
        assert_eq!(sim.compute_bounds(), Ok((-2.0, 8.0)));
    }

    #[test]
    fn single_interior_cell_settles_in_one_sweep_when_within_epsilon() {
        // The lone interior cell becomes (8 + 0 + 0 + 8) / 4 = 4; starting
        // at 4 the first sweep moves nothing.
        let mut sim = Simulation::with_config(EngineConfig {
            worker_count: Some(1),
        });
        sim.set_epsilon(0.01).unwrap();
        sim.load(grid_3x3(4.0));
        let report = sim.run().unwrap();
        assert_eq!(report.outcome, Outcome::Converged);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.workers, 1);
        assert_eq!(sim.value_at(1, 1), Ok(4.0));
    }

    #[test]
    fn single_interior_cell_needs_two_sweeps_from_a_cold_start() {
        let mut sim = Simulation::new();
        sim.set_epsilon(0.01).unwrap();
        sim.load(grid_3x3(100.0));
        let report = sim.run().unwrap();
        assert_eq!(report.outcome, Outcome::Converged);
        assert_eq!(report.iterations, 2);
        assert_eq!(sim.value_at(1, 1), Ok(4.0));
        assert_eq!(sim.state(), SimState::Finished(Outcome::Converged));
    }

    #[test]
    fn terminal_state_requires_a_fresh_load() {
        let mut sim = Simulation::new();
        sim.set_epsilon(0.01).unwrap();
        sim.load(grid_3x3(4.0));
        sim.run().unwrap();
        assert_eq!(sim.run().unwrap_err(), EngineError::AlreadyFinished);

        sim.load(grid_3x3(100.0));
        assert_eq!(sim.state(), SimState::Loaded);
        let report = sim.run().unwrap();
        assert_eq!(report.outcome, Outcome::Converged);
    }

    #[test]
    fn pre_cancelled_run_keeps_the_loaded_grid() {
        let mut sim = Simulation::new();
        sim.set_epsilon(0.0).unwrap();
        let original = grid_3x3(100.0);
        sim.load(original.clone());
        sim.cancel_token().cancel();

        let report = sim.run().unwrap();
        assert_eq!(report.outcome, Outcome::Cancelled);
        assert_eq!(sim.state(), SimState::Finished(Outcome::Cancelled));
        assert_eq!(sim.grid(), Some(&original));
    }

    #[test]
    fn load_clears_a_pending_cancellation() {
        let mut sim = Simulation::new();
        sim.set_epsilon(0.01).unwrap();
        sim.load(grid_3x3(4.0));
        sim.cancel_token().cancel();

        sim.load(grid_3x3(4.0));
        let report = sim.run().unwrap();
        assert_eq!(report.outcome, Outcome::Converged);
    }

    #[test]
    fn terminal_events_are_emitted() {
        let mut sim = Simulation::new();
        sim.set_epsilon(0.01).unwrap();
        let events = sim.subscribe();
        sim.load(grid_3x3(100.0));
        sim.run().unwrap();

        let collected: Vec<SimEvent> = events.try_iter().collect();
        assert_eq!(
            collected,
            vec![
                SimEvent::IterationCompleted { iteration: 1 },
                SimEvent::Converged { iterations: 2 },
            ]
        );
    }
}

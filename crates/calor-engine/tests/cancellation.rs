//! Cooperative cancellation of detached runs.

use calor_engine::{EngineConfig, EngineError, Outcome, SimEvent, SimState, Simulation};
use calor_test_utils::hot_top;

#[test]
fn cancelling_a_detached_run_terminates_it_cleanly() {
    // A tolerance this tight keeps a 64x64 plate busy for tens of
    // thousands of sweeps, so the cancel lands mid-run.
    let start = hot_top(64, 64, 100.0, 0.0);
    let mut sim = Simulation::with_config(EngineConfig {
        worker_count: Some(2),
    });
    sim.set_epsilon(1e-12).unwrap();
    let events = sim.subscribe();
    sim.load(start.clone());

    let handle = sim.run_detached().unwrap();
    // Wait until at least one sweep completed, then pull the plug.
    let first = events.recv().unwrap();
    assert!(matches!(first, SimEvent::IterationCompleted { .. }));
    handle.cancel();

    let (sim, report) = handle.join();
    let report = report.unwrap();
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(sim.state(), SimState::Finished(Outcome::Cancelled));

    // The result is a fully completed sweep: borders intact, values finite.
    let grid = sim.grid().unwrap();
    for col in 0..64 {
        assert_eq!(grid.get(0, col), Some(100.0));
        assert_eq!(grid.get(63, col), Some(0.0));
    }

    // The terminal event is a cancellation, not a convergence.
    let last = events.try_iter().last().unwrap();
    assert!(matches!(last, SimEvent::Cancelled { .. }));
}

#[test]
fn cancelled_runs_stay_terminal_until_a_fresh_load() {
    let mut sim = Simulation::new();
    sim.set_epsilon(0.0).unwrap();
    sim.load(hot_top(4, 4, 10.0, 0.0));
    sim.cancel_token().cancel();
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, Outcome::Cancelled);

    assert_eq!(sim.run().unwrap_err(), EngineError::AlreadyFinished);

    sim.load(hot_top(4, 4, 10.0, 0.0));
    sim.set_epsilon(0.5).unwrap();
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, Outcome::Converged);
}

#[test]
fn detached_run_rejects_an_unloaded_simulation() {
    let sim = Simulation::new();
    match sim.run_detached() {
        Err(EngineError::NotLoaded) => {}
        other => panic!("expected NotLoaded, got {other:?}"),
    }
}

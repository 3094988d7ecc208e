//! Verification harness for the calor relaxation engine.
//!
//! Walks one or more test directories, runs every discovered case
//! (`input<case>-<epsilon>.csv`) through the engine, and diffs the
//! settled grid against the matching `output<case>-<epsilon>.csv` within
//! the precision the reference file was written with.
//!
//! ```bash
//! # Run every case under tests/plates with a 4-worker pool
//! calor-cli -j 4 tests/plates
//! ```
//!
//! Exits non-zero when any case fails to load, run, or match.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use calor_engine::{EngineConfig, Simulation};

mod cases;
mod error;
mod verify;

use cases::TestCase;
use error::HarnessError;
use verify::compare_interior;

/// Run relaxation test cases and diff them against reference outputs.
#[derive(Parser, Debug)]
#[command(name = "calor-cli", version, about)]
struct Args {
    /// Test directories holding input/output CSV pairs.
    #[arg(required = true)]
    directories: Vec<PathBuf>,

    /// Worker pool size (defaults to the available parallelism).
    #[arg(short = 'j', long = "workers")]
    workers: Option<usize>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut passed = 0usize;
    let mut failed = 0usize;
    for dir in &args.directories {
        println!("test directory: {}", dir.display());
        match run_directory(dir, &args) {
            Ok((dir_passed, dir_failed)) => {
                passed += dir_passed;
                failed += dir_failed;
            }
            Err(e) => {
                log::error!("{e}");
                failed += 1;
            }
        }
    }

    println!("{passed} passed, {failed} failed");
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Run every case in one directory; returns (passed, failed) counts.
fn run_directory(dir: &Path, args: &Args) -> Result<(usize, usize), HarnessError> {
    let cases = cases::discover_cases(dir)?;
    if cases.is_empty() {
        log::warn!("no test cases in {}", dir.display());
    }

    let mut passed = 0;
    let mut failed = 0;
    for (stem, case) in &cases {
        match run_case(case, args.workers) {
            Ok(None) => {
                println!("case {stem}: PASS");
                passed += 1;
            }
            Ok(Some(failure)) => {
                println!("case {stem}: FAIL - {failure}");
                failed += 1;
            }
            Err(e) => {
                println!("case {stem}: ERROR - {e}");
                failed += 1;
            }
        }
    }
    Ok((passed, failed))
}

/// Run one case to convergence and diff it against its reference file.
fn run_case(
    case: &TestCase,
    workers: Option<usize>,
) -> Result<Option<verify::CaseFailure>, HarnessError> {
    if !case.expected.is_file() {
        return Err(HarnessError::MissingExpected {
            path: case.expected.clone(),
        });
    }
    let grid = load(&case.input)?;

    let mut sim = Simulation::with_config(EngineConfig {
        worker_count: workers,
    });
    sim.set_epsilon(case.epsilon)?;
    sim.load(grid);
    let report = sim.run()?;
    log::info!(
        "case {}: {:?} after {} sweeps on {} workers in {:?}",
        case.name,
        report.outcome,
        report.iterations,
        report.workers,
        report.elapsed
    );

    let expected = load(&case.expected)?;
    let tolerance = calor_io::read_tolerance(&case.expected).map_err(|source| {
        HarnessError::Load {
            path: case.expected.clone(),
            source,
        }
    })?;
    let settled = sim.grid().ok_or(calor_engine::EngineError::NotLoaded)?;
    Ok(compare_interior(settled, &expected, tolerance))
}

fn load(path: &Path) -> Result<calor_core::Grid, HarnessError> {
    calor_io::read_grid(path).map_err(|source| HarnessError::Load {
        path: path.to_path_buf(),
        source,
    })
}

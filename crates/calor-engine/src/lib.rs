//! Concurrent Jacobi relaxation engine.
//!
//! A [`Simulation`] owns two grid buffers and a tolerance, and drives a
//! fixed pool of row workers through repeated sweeps until no interior
//! cell moves by more than the tolerance (or the run is cancelled).
//!
//! # Architecture
//!
//! ```text
//! Caller Thread            Coordinator               Row Workers (N)
//!     |                        |                          |
//!     |--run()---------------->| partition rows           |
//!     |                        | spawn calor-worker-{i}   |
//!     |                        |--Advance{read side}----->| sweep own rows:
//!     |                        |                          |   borders copied,
//!     |                        |                          |   interior = mean
//!     |                        |<--Report{settled}--------|   of 4 neighbours
//!     |                        | gather all N reports     |
//!     |                        | settled? cancelled?      |
//!     |                        | flip buffer roles        |
//!     |                        | loop or tear down pool   |
//!     |<--RunReport------------|                          |
//! ```
//!
//! Within one sweep every worker reads the same frozen buffer and writes
//! a disjoint band of rows in the other, so the hot path needs no locks.
//! The coordinator flips the buffer roles only after all `N` reports have
//! arrived, which is the happens-before edge between sweep `k`'s writes
//! and sweep `k + 1`'s reads.
//!
//! Cancellation is cooperative: a [`CancelToken`] is checked by each
//! worker before every row and by the coordinator after every barrier.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod buffer;
mod config;
mod error;
mod event;
mod partition;
mod report;
mod sim;
mod worker;

pub use config::EngineConfig;
pub use error::{EngineError, ParameterError};
pub use event::SimEvent;
pub use partition::{clamp_worker_count, partition, range_for, RowRange};
pub use report::{Outcome, RunReport};
pub use sim::{CancelToken, RunHandle, SimState, Simulation};

//! Row workers: the leaf units of the relaxation pool.
//!
//! A worker's identity is just its index and its fixed band of rows. It
//! holds no thread state of its own — the coordinator parks each worker
//! in a loop on a command channel and tears the pool down by dropping the
//! senders.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::buffer::GridBuffers;
use crate::partition::RowRange;

/// Commands broadcast by the coordinator.
pub(crate) enum WorkerCommand {
    /// Run one sweep over the worker's band, reading from `read_side`.
    Advance {
        /// Which buffer side is frozen for this sweep.
        read_side: usize,
    },
    /// Leave the command loop; the run is over.
    Halt,
}

/// One worker's answer to an `Advance` command.
pub(crate) struct WorkerReport {
    /// Index of the reporting worker.
    #[allow(dead_code)]
    pub(crate) worker: usize,
    /// True when none of this band's interior cells moved more than epsilon.
    pub(crate) settled: bool,
}

/// A leaf worker owning one contiguous band of rows for the run.
pub(crate) struct RowWorker {
    pub(crate) index: usize,
    pub(crate) band: RowRange,
    pub(crate) epsilon: f64,
    pub(crate) buffers: Arc<GridBuffers>,
    pub(crate) cancel: Arc<AtomicBool>,
}

impl RowWorker {
    /// The worker thread body: serve `Advance` commands until halted.
    ///
    /// Every `Advance` is answered with exactly one report, even when the
    /// sweep was cut short by cancellation — the coordinator's barrier
    /// counts reports from the whole pool.
    pub(crate) fn run(self, commands: Receiver<WorkerCommand>, reports: Sender<WorkerReport>) {
        while let Ok(command) = commands.recv() {
            match command {
                WorkerCommand::Advance { read_side } => {
                    let settled = self.advance(read_side);
                    let report = WorkerReport {
                        worker: self.index,
                        settled,
                    };
                    if reports.send(report).is_err() {
                        break;
                    }
                }
                WorkerCommand::Halt => break,
            }
        }
    }

    /// One sweep over this worker's band.
    ///
    /// Border cells are carried forward unchanged; each interior cell
    /// becomes the mean of its four orthogonal neighbours in the frozen
    /// read buffer. Returns true when every interior cell of the band
    /// stayed within epsilon of its previous value.
    ///
    /// The cancel flag is checked before each row, so an in-flight sweep
    /// stops on a row boundary and never exposes a half-written row.
    pub(crate) fn advance(&self, read_side: usize) -> bool {
        let rows = self.buffers.rows();
        let cols = self.buffers.cols();
        let prev = self.buffers.read_side(read_side);
        let out = self.buffers.write_band(1 - read_side, self.band);

        let mut settled = true;
        for row in self.band.start..self.band.end {
            if self.cancel.load(Ordering::Acquire) {
                return settled;
            }
            let base = row * cols;
            let local = (row - self.band.start) * cols;
            if row == 0 || row == rows - 1 {
                out[local..local + cols].copy_from_slice(&prev[base..base + cols]);
                continue;
            }
            out[local] = prev[base];
            for col in 1..cols - 1 {
                let rank = base + col;
                let mean =
                    (prev[rank - cols] + prev[rank + cols] + prev[rank - 1] + prev[rank + 1]) / 4.0;
                out[local + col] = mean;
                if (mean - prev[rank]).abs() > self.epsilon {
                    settled = false;
                }
            }
            out[local + cols - 1] = prev[base + cols - 1];
        }
        settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calor_core::Grid;
    use std::thread;

    fn buffers() -> Arc<GridBuffers> {
        let grid = Grid::from_rows(vec![
            vec![8.0, 8.0, 8.0, 8.0],
            vec![0.0, 4.0, 4.0, 0.0],
            vec![0.0, 4.0, 4.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        Arc::new(GridBuffers::new(&grid))
    }

    fn worker(band: RowRange, epsilon: f64, buffers: Arc<GridBuffers>) -> RowWorker {
        RowWorker {
            index: 0,
            band,
            epsilon,
            buffers,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    #[test]
    fn advance_copies_borders_and_averages_interior() {
        let buffers = buffers();
        let all = RowRange { start: 0, end: 4 };
        worker(all, 0.01, Arc::clone(&buffers)).advance(0);

        let out = buffers.read_side(1);
        // Border rows and columns carried forward.
        assert_eq!(&out[0..4], &[8.0, 8.0, 8.0, 8.0]);
        assert_eq!(&out[12..16], &[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(out[4], 0.0);
        assert_eq!(out[7], 0.0);
        // Interior (1,1): mean of up=8, down=4, left=0, right=4.
        assert_eq!(out[5], 4.0);
        // Interior (2,2): mean of up=4, down=0, left=4, right=0.
        assert_eq!(out[10], 2.0);
    }

    #[test]
    fn settled_reflects_epsilon() {
        let buffers = buffers();
        let all = RowRange { start: 0, end: 4 };
        // (1,1) moves from 4.0 to 4.0; (1,2) from 4.0 to (8+4+4+0)/4 = 4.0;
        // (2,1) from 4.0 to (4+0+0+4)/4 = 2.0; (2,2) from 4.0 to 2.0.
        assert!(!worker(all, 1.9, Arc::clone(&buffers)).advance(0));
        assert!(worker(all, 2.0, buffers).advance(0));
    }

    #[test]
    fn cancelled_worker_stops_on_a_row_boundary_but_still_reports() {
        let buffers = buffers();
        let cancel = Arc::new(AtomicBool::new(true));
        let unit = RowWorker {
            index: 3,
            band: RowRange { start: 0, end: 4 },
            epsilon: 0.0,
            buffers: Arc::clone(&buffers),
            cancel,
        };

        let (command_tx, command_rx) = crossbeam_channel::bounded(1);
        let (report_tx, report_rx) = crossbeam_channel::bounded(1);
        let handle = thread::spawn(move || unit.run(command_rx, report_tx));

        command_tx
            .send(WorkerCommand::Advance { read_side: 0 })
            .unwrap();
        let report = report_rx.recv().unwrap();
        assert_eq!(report.worker, 3);
        assert!(report.settled, "no row processed, nothing moved");
        // No row was written: the write side is still all zeroes.
        assert_eq!(buffers.read_side(1), &[0.0; 16]);

        command_tx.send(WorkerCommand::Halt).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn workers_only_write_their_own_band() {
        let buffers = buffers();
        worker(RowRange { start: 1, end: 2 }, 0.0, Arc::clone(&buffers)).advance(0);
        let out = buffers.read_side(1);
        // Row 1 written, rows 0, 2, 3 untouched.
        assert_eq!(&out[4..8], &[0.0, 4.0, 4.0, 0.0]);
        assert_eq!(&out[0..4], &[0.0; 4]);
        assert_eq!(&out[8..16], &[0.0; 8]);
    }
}

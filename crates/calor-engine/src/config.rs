//! Engine configuration.

/// Tunables for a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    /// Worker pool size. `None` auto-detects from the machine's available
    /// parallelism. Either way the pool is clamped so every worker owns at
    /// least one row.
    pub worker_count: Option<usize>,
}

impl EngineConfig {
    /// Resolve the pool size for a grid with `row_count` rows.
    ///
    /// Explicit values are clamped to `[1, row_count]`; auto-detection
    /// takes `min(available_parallelism, row_count)`.
    pub fn resolved_worker_count(&self, row_count: usize) -> usize {
        let requested = self.worker_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        });
        crate::partition::clamp_worker_count(requested, row_count)
    }
}

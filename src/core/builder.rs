use std::sync::Arc;

use crate::{
    core::{config::RunnerConfig, runner::Runner},
    stats::StatsStore,
};

/// Builder for constructing a [`Runner`] with injected collaborators.
pub struct RunnerBuilder {
    cfg: RunnerConfig,
    stats: Option<Arc<StatsStore>>,
}

impl RunnerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: RunnerConfig) -> Self {
        Self { cfg, stats: None }
    }

    /// Shares an existing statistics store with the runner.
    ///
    /// Without it, the runner records into a store of its own.
    pub fn with_stats(mut self, stats: Arc<StatsStore>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Builds the runner and starts its workers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Runner {
        let stats = self.stats.unwrap_or_default();
        Runner::start(self.cfg, stats)
    }
}

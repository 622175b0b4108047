//! # Statistics store shared by all workers.
//!
//! ## Rules
//! - Entries are created lazily on the first recorded run.
//! - Entries live until [`StatsStore::remove`] is called (e.g. when a check is unscheduled).
//! - Reads return **snapshots** (clones); callers never hold the lock.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::checks::{Check, CheckId};
use crate::error::CheckError;
use crate::stats::CheckStats;

/// Thread-safe map of per-check run statistics.
///
/// Injected into [`Runner`](crate::Runner) so tests and multiple runners in one process
/// stay isolated.
#[derive(Default)]
pub struct StatsStore {
    entries: RwLock<HashMap<CheckId, CheckStats>>,
}

impl StatsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one run of `check`, creating its entry if needed.
    pub async fn record(
        &self,
        check: &dyn Check,
        elapsed: Duration,
        result: &Result<(), CheckError>,
        warnings: Vec<String>,
        metrics: HashMap<String, i64>,
    ) {
        let mut entries = self.entries.write().await;
        entries
            .entry(check.id().clone())
            .or_insert_with(|| CheckStats::new(check.id().clone(), check.name()))
            .add(elapsed, result, warnings, metrics);
    }

    /// Returns a snapshot of the entry for `id`.
    pub async fn get(&self, id: &CheckId) -> Option<CheckStats> {
        self.entries.read().await.get(id).cloned()
    }

    /// Returns the number of recorded runs for `id` (`0` if never run).
    pub async fn total_runs(&self, id: &CheckId) -> u64 {
        self.entries
            .read()
            .await
            .get(id)
            .map(|s| s.total_runs)
            .unwrap_or(0)
    }

    /// Drops the entry for `id`; returns `true` if it existed.
    pub async fn remove(&self, id: &CheckId) -> bool {
        self.entries.write().await.remove(id).is_some()
    }

    /// Returns sorted identities that have statistics.
    pub async fn ids(&self) -> Vec<CheckId> {
        let entries = self.entries.read().await;
        let mut ids: Vec<CheckId> = entries.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

//! # Runner-wide counters.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Point-in-time view of runner activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunnerStats {
    /// Number of worker loops started.
    pub workers: usize,
    /// Checks currently executing.
    pub running: usize,
    /// Runs completed (success or error).
    pub runs: u64,
    /// Runs that returned an error.
    pub errors: u64,
    /// Warnings reported by checks.
    pub warnings: u64,
    /// Submissions discarded because the same identity was already running.
    pub skipped: u64,
}

/// Lock-free counters updated by workers.
#[derive(Default)]
pub(crate) struct RunnerCounters {
    workers: AtomicUsize,
    running: AtomicUsize,
    runs: AtomicU64,
    errors: AtomicU64,
    warnings: AtomicU64,
    skipped: AtomicU64,
}

impl RunnerCounters {
    pub(crate) fn set_workers(&self, n: usize) {
        self.workers.store(n, Ordering::Relaxed);
    }

    pub(crate) fn started(&self) {
        self.running.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn finished(&self, failed: bool, warnings: usize) {
        self.running.fetch_sub(1, Ordering::Relaxed);
        self.runs.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        self.warnings.fetch_add(warnings as u64, Ordering::Relaxed);
    }

    pub(crate) fn skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RunnerStats {
        RunnerStats {
            workers: self.workers.load(Ordering::Relaxed),
            running: self.running.load(Ordering::Relaxed),
            runs: self.runs.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

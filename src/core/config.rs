//! # Runner configuration.
//!
//! Provides [`RunnerConfig`] centralized settings for the worker pool.
//!
//! ## Sentinel values
//! - `workers = 0` → clamped to one worker
//! - `queue_capacity = 0` → clamped to one slot

use std::time::Duration;

use crate::policies::LogPolicy;

/// Configuration for a [`Runner`](crate::Runner).
///
/// ## Field semantics
/// - `workers`: number of worker loops draining the pending queue
/// - `queue_capacity`: pending queue size; `submit` waits when it is full
/// - `stop_timeout`: how long a stop request waits for a check to finish
/// - `grace`: how long shutdown waits for workers to exit after stopping checks
/// - `log_policy`: which runs are logged at normal verbosity
///
/// All fields are public; prefer the accessors to avoid sprinkling sentinel checks.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Number of concurrent workers.
    pub workers: usize,

    /// Capacity of the pending queue.
    pub queue_capacity: usize,

    /// Upper bound for a single stop request.
    ///
    /// When exceeded, [`Runner::stop_check`](crate::Runner::stop_check) returns
    /// `RuntimeError::StopTimeout` and the check keeps running detached.
    pub stop_timeout: Duration,

    /// Upper bound for joining workers during shutdown.
    pub grace: Duration,

    /// Logging-throttle policy applied to every run.
    pub log_policy: LogPolicy,
}

impl RunnerConfig {
    /// Returns the worker count clamped to a minimum of 1.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }

    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for RunnerConfig {
    /// Default configuration:
    ///
    /// - `workers = 4`
    /// - `queue_capacity = 1024`
    /// - `stop_timeout = 5s`
    /// - `grace = 5s`
    /// - `log_policy = LogPolicy::default()`
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
            stop_timeout: Duration::from_secs(5),
            grace: Duration::from_secs(5),
            log_policy: LogPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_clamped() {
        let cfg = RunnerConfig {
            workers: 0,
            queue_capacity: 0,
            ..RunnerConfig::default()
        };
        assert_eq!(cfg.worker_count(), 1);
        assert_eq!(cfg.queue_capacity_clamped(), 1);
    }
}

//! # Logging-throttle policy.
//!
//! New or reconfigured checks log every run so an operator can confirm they work, then the
//! runner falls back to sampling so log volume does not grow with run frequency.
//!
//! Decision over `n`, the number of runs recorded **before** the upcoming one:
//! ```text
//! n <= initial_burst             → log (last_of_burst when n == initial_burst)
//! n % periodic_interval == 0     → log
//! otherwise                      → debug only
//! ```
//!
//! With the defaults:
//! ```text
//! n:    0 1 2 3 4 5 6 .. 19 20 21 .. 39 40
//! log:  ✓ ✓ ✓ ✓ ✓ ✓ ·     · ✓  ·      · ✓
//! last:           ✓
//! ```

/// Number of leading runs that are always logged.
pub const INITIAL_BURST: u64 = 5;

/// After the initial burst, one run in this many is logged.
pub const PERIODIC_INTERVAL: u64 = 20;

/// Outcome of [`LogPolicy::decide`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogDecision {
    /// Log the run at normal verbosity.
    pub log: bool,
    /// This run closes the initial burst; later runs are sampled.
    pub last_of_burst: bool,
}

/// Policy deciding which runs of a check are logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogPolicy {
    /// Runs with a counter up to and including this value are logged.
    pub initial_burst: u64,
    /// Afterwards, runs whose counter is a multiple of this value are logged (`0` = never).
    pub periodic_interval: u64,
}

impl LogPolicy {
    /// Decides whether the run with `total_runs` previous runs should be logged.
    ///
    /// # Example
    /// ```
    /// use checkrunner::LogPolicy;
    ///
    /// let p = LogPolicy::default();
    /// assert!(p.decide(5).log && p.decide(5).last_of_burst);
    /// assert!(!p.decide(6).log);
    /// assert!(p.decide(40).log);
    /// ```
    pub fn decide(&self, total_runs: u64) -> LogDecision {
        if total_runs <= self.initial_burst {
            return LogDecision {
                log: true,
                last_of_burst: total_runs == self.initial_burst,
            };
        }
        let periodic = self.periodic_interval != 0 && total_runs % self.periodic_interval == 0;
        LogDecision {
            log: periodic,
            last_of_burst: false,
        }
    }
}

impl Default for LogPolicy {
    /// Returns `initial_burst = 5`, `periodic_interval = 20`.
    fn default() -> Self {
        Self {
            initial_burst: INITIAL_BURST,
            periodic_interval: PERIODIC_INTERVAL,
        }
    }
}

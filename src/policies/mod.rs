//! Execution policies.
//!
//! ## Contents
//! - [`LogPolicy`] whether the outcome of an upcoming run is logged at normal verbosity
//!
//! ## Quick wiring
//! ```text
//! RunnerConfig { log_policy: LogPolicy, .. }
//!      └─► core::worker uses:
//!           - log_policy.decide(stats.total_runs(id)) before each run
//! ```
//!
//! ## Defaults
//! - `LogPolicy::default()` → runs with 0 through 5 prior runs logged (six runs), then every run whose prior count is a multiple of 20.

mod log;

pub use log::{INITIAL_BURST, LogDecision, LogPolicy, PERIODIC_INTERVAL};

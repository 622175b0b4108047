//! # Run statistics.
//!
//! - [`CheckStats`] - accumulated counters of a single check identity
//! - [`StatsStore`] - shared map of [`CheckStats`], injected into the runner
//! - [`RunnerStats`] - runner-wide counters snapshot
//!
//! ## Architecture
//! ```text
//! worker ──► StatsStore::total_runs(id) ──► LogPolicy::decide()
//!        ──► check.run()
//!        ──► StatsStore::record(id, elapsed, result, warnings, metrics)
//!        ──► RunnerCounters (runs / errors / warnings)
//! ```

mod counters;
mod entry;
mod store;

pub(crate) use counters::RunnerCounters;
pub use counters::RunnerStats;
pub use entry::CheckStats;
pub use store::StatsStore;

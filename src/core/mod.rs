//! Runtime core: worker pool and check lifecycle.
//!
//! The public API from this module is [`Runner`] (with its [`RunnerHandle`],
//! [`RunnerBuilder`] and [`RunnerConfig`]).
//!
//! Internal modules:
//! - [`worker`]: drains the pending queue and executes one check at a time;
//! - [`registry`]: tracks running checks for de-duplication and targeted stop;
//! - [`runner`]: owns queue, registry and workers; stop and shutdown protocol;
//! - [`builder`]: wires injected collaborators into a runner.

mod builder;
mod config;
mod registry;
mod runner;
mod worker;

pub use builder::RunnerBuilder;
pub use config::RunnerConfig;
pub use runner::{Runner, RunnerHandle};

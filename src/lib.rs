//! # checkrunner
//!
//! **checkrunner** is the execution core of a telemetry-collection agent: a bounded worker
//! pool that executes periodic *checks* handed to it by an external scheduler.
//!
//! It guarantees at most one concurrent execution per check identity, supports cooperative
//! cancellation bounded by a timeout, and throttles run logging so high-frequency checks do
//! not flood the log.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Check     │   │    Check     │   │    Check     │
//!     │ (cpu:9f2c..) │   │ (disk:01ab..)│   │ (ntp:77e0..) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────────────┼──────────────────┘
//!                               ▼  RunnerHandle::submit()  (waits when full)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Runner                                                           │
//! │  - pending queue (bounded mpsc, closed on shutdown)               │
//! │  - Registry (id → running check, cancel token, finished latch)    │
//! │  - StatsStore (injected; per-check run counters)                  │
//! │  - LogPolicy (initial burst, then periodic sampling)              │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────┐       ┌──────────┐       ┌──────────┐
//!     │ worker 0 │       │ worker 1 │  ...  │ worker N │
//!     └──────────┘       └──────────┘       └──────────┘
//!  claim id ─► decide logging ─► run ─► record stats ─► log ─► release id
//! ```
//!
//! ### Stop
//! ```text
//! stop_check(id) ─► registry lookup ─┬─ absent ─► Ok(())
//!                                    └─ present ─► cancel token + Check::stop() (blocking thread)
//!                                                  └─► wait hook + release ≤ stop_timeout
//!                                                        ├─ released ─► Ok(())
//!                                                        └─ elapsed  ─► StopTimeout { id }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                        |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------|
//! | **Checks**        | Contract for recurring, cancelable units of work.             | [`Check`], [`CheckFn`], [`CheckId`]       |
//! | **Execution**     | Worker pool, de-duplication, stop and shutdown.               | [`Runner`], [`RunnerHandle`]              |
//! | **Statistics**    | Per-check run counters and runner-wide counters.              | [`StatsStore`], [`CheckStats`]            |
//! | **Policies**      | Logging throttle.                                             | [`LogPolicy`]                             |
//! | **Errors**        | Typed errors for the runner, checks and submission.           | [`RuntimeError`], [`CheckError`]          |
//! | **Configuration** | Worker count, queue capacity, timeouts.                       | [`RunnerConfig`]                          |
//!
//! ## Logging
//! The crate emits [`tracing`] events (`check` field = check id) and never installs a
//! subscriber.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use checkrunner::{Check, CheckError, CheckFn, CheckRef, Runner, RunnerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Runner::new(RunnerConfig::default());
//!     let scheduler = runner.handle();
//!
//!     let ping: CheckRef = CheckFn::arc("ping", |ctx: CancellationToken| async move {
//!         if ctx.is_cancelled() {
//!             return Err(CheckError::Canceled);
//!         }
//!         Ok(())
//!     });
//!     scheduler.submit(ping.clone()).await?;
//!
//!     while runner.stats().total_runs(ping.id()).await == 0 {
//!         tokio::time::sleep(Duration::from_millis(5)).await;
//!     }
//!     runner.stop_check(ping.id()).await?;
//!     runner.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod checks;
mod core;
mod error;
mod policies;
mod stats;

// ---- Public re-exports ----

pub use checks::{Check, CheckFn, CheckId, CheckRef};
pub use crate::core::{Runner, RunnerBuilder, RunnerConfig, RunnerHandle};
pub use error::{CheckError, RuntimeError, SubmitError};
pub use policies::{INITIAL_BURST, LogDecision, LogPolicy, PERIODIC_INTERVAL};
pub use stats::{CheckStats, RunnerStats, StatsStore};

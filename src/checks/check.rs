//! # Check contract.
//!
//! This module defines the [`Check`] trait (async, cancelable) and the shared handle type
//! [`CheckRef`], an `Arc<dyn Check>` suitable for passing through the pending queue.
//!
//! A check receives a [`CancellationToken`] for every run and should check it to stop
//! cooperatively when the runner asks it to.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::checks::CheckId;
use crate::error::CheckError;

/// Shared handle to a check object.
pub type CheckRef = Arc<dyn Check>;

/// # Recurring, cancelable unit of work.
///
/// The runner only touches a check through this trait; it never inspects check internals.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use checkrunner::{Check, CheckError, CheckId};
///
/// struct Uptime {
///     id: CheckId,
/// }
///
/// #[async_trait]
/// impl Check for Uptime {
///     fn id(&self) -> &CheckId { &self.id }
///     fn name(&self) -> &str { "uptime" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), CheckError> {
///         if ctx.is_cancelled() {
///             return Err(CheckError::Canceled);
///         }
///         // collect...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Check: Send + Sync + 'static {
    /// Returns the stable identity of this check instance.
    fn id(&self) -> &CheckId;

    /// Returns a human-readable check name.
    fn name(&self) -> &str;

    /// Applies instance and init configuration.
    ///
    /// Called by whoever loads the check, never by the runner.
    fn configure(&self, _instance: &str, _init_config: &str) -> Result<(), CheckError> {
        Ok(())
    }

    /// Performs one run of the check.
    ///
    /// The calling worker is occupied until the returned future completes.
    /// Implementations should watch `ctx` and return [`CheckError::Canceled`] once it fires.
    async fn run(&self, ctx: CancellationToken) -> Result<(), CheckError>;

    /// Interval between two runs; consumed by the scheduler only.
    fn interval(&self) -> Duration {
        Duration::from_secs(15)
    }

    /// Requests cooperative cancellation of an in-progress run.
    ///
    /// Invoked on a blocking thread after the run's token has been cancelled. May block; the
    /// runner stops waiting for it after its stop timeout.
    fn stop(&self) {}

    /// Returns warnings raised since the previous call.
    fn warnings(&self) -> Vec<String> {
        Vec::new()
    }

    /// Returns per-metric sample counts of the last run.
    fn metric_stats(&self) -> Result<HashMap<String, i64>, CheckError> {
        Ok(HashMap::new())
    }
}

//! Error types used by the check runner and by checks.
//!
//! This module defines three enums:
//!
//! - [`RuntimeError`] - errors raised by the runner itself (stop timeouts, shutdown grace).
//! - [`CheckError`] - errors returned by individual check executions.
//! - [`SubmitError`] - errors returned by the submission endpoint.
//!
//! `RuntimeError` and `CheckError` provide helper methods (`as_label`, `as_message`)
//! for logs and metrics.

use std::time::Duration;
use thiserror::Error;

use crate::checks::CheckId;

/// # Errors produced by the runner.
///
/// These represent failures of the execution core itself, never of a check's own work.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A stop request was issued but the check did not finish within the stop timeout.
    ///
    /// The check keeps running detached; it leaves the registry once it returns.
    #[error("timeout during stop operation on check id {id}")]
    StopTimeout {
        /// Identity of the check that did not stop.
        id: CheckId,
    },

    /// Shutdown could not join every worker within the grace period.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Checks still executing when the grace period ran out.
        stuck: Vec<CheckId>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use checkrunner::{CheckId, RuntimeError};
    ///
    /// let err = RuntimeError::StopTimeout { id: CheckId::new("cpu") };
    /// assert_eq!(err.as_label(), "runtime_stop_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::StopTimeout { .. } => "runtime_stop_timeout",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::StopTimeout { id } => format!("check {id} did not stop in time"),
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck checks={stuck:?}")
            }
        }
    }
}

/// # Errors produced by a check.
///
/// A failed run is recorded in the statistics store and logged; it never stops the
/// worker that executed it.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// The run failed; the scheduler may submit the check again.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The check is broken beyond a single run (e.g. poisoned state).
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The check rejected its configuration.
    #[error("invalid configuration: {error}")]
    Config {
        /// The underlying error message.
        error: String,
    },

    /// The run observed its cancellation token and exited early.
    #[error("context cancelled")]
    Canceled,
}

impl CheckError {
    /// Shorthand for [`CheckError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        CheckError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use checkrunner::CheckError;
    ///
    /// assert_eq!(CheckError::fail("boom").as_label(), "check_failed");
    /// assert_eq!(CheckError::Canceled.as_label(), "check_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CheckError::Fail { .. } => "check_failed",
            CheckError::Fatal { .. } => "check_fatal",
            CheckError::Config { .. } => "check_config",
            CheckError::Canceled => "check_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CheckError::Fail { error } => format!("error: {error}"),
            CheckError::Fatal { error } => format!("fatal: {error}"),
            CheckError::Config { error } => format!("config: {error}"),
            CheckError::Canceled => "context cancelled".to_string(),
        }
    }
}

/// Errors returned when handing a check to the runner.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The runner has been shut down; no new submissions are accepted.
    #[error("runner is closed")]
    Closed,
    /// The pending queue is full (only from non-blocking submission).
    #[error("pending queue is full")]
    Full,
}

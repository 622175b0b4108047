//! # Per-check statistics entry.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, SystemTime};

use crate::checks::CheckId;
use crate::error::CheckError;

/// Number of recent execution times kept per check.
pub const EXECUTION_TIMES_WINDOW: usize = 32;

/// Cap for the lifetime metric-sample counter; it stops growing past this value.
const TOTAL_METRIC_SAMPLES_CAP: u64 = 1_000_000;

/// Accumulated run statistics of one check identity.
///
/// ### Rules
/// - `total_runs` increases on every recorded run, success or failure.
/// - Only the worker currently owning the identity in the registry records into it.
#[derive(Clone, Debug)]
pub struct CheckStats {
    /// Identity of the check.
    pub check_id: CheckId,
    /// Human-readable name of the check.
    pub check_name: String,
    /// Number of recorded runs.
    pub total_runs: u64,
    /// Number of runs that returned an error.
    pub total_errors: u64,
    /// Number of warnings reported across all runs.
    pub total_warnings: u64,
    /// The last [`EXECUTION_TIMES_WINDOW`] execution times, oldest first.
    pub execution_times: VecDeque<Duration>,
    /// Mean of `execution_times`.
    pub average_execution_time: Duration,
    /// Duration of the most recent run.
    pub last_execution_time: Duration,
    /// Error of the most recent run, `None` if it succeeded.
    pub last_error: Option<String>,
    /// Warnings reported by the most recent run.
    pub last_warnings: Vec<String>,
    /// Metric stats reported by the most recent run.
    pub metric_samples: HashMap<String, i64>,
    /// Sum of all reported metric samples (capped).
    pub total_metric_samples: u64,
    /// Wall-clock time of the last update.
    pub updated_at: SystemTime,
}

impl CheckStats {
    /// Creates an empty entry.
    pub fn new(check_id: CheckId, check_name: impl Into<String>) -> Self {
        Self {
            check_id,
            check_name: check_name.into(),
            total_runs: 0,
            total_errors: 0,
            total_warnings: 0,
            execution_times: VecDeque::with_capacity(EXECUTION_TIMES_WINDOW),
            average_execution_time: Duration::ZERO,
            last_execution_time: Duration::ZERO,
            last_error: None,
            last_warnings: Vec::new(),
            metric_samples: HashMap::new(),
            total_metric_samples: 0,
            updated_at: SystemTime::now(),
        }
    }

    /// Folds the outcome of one run into the entry.
    pub fn add(
        &mut self,
        elapsed: Duration,
        result: &Result<(), CheckError>,
        warnings: Vec<String>,
        metrics: HashMap<String, i64>,
    ) {
        self.total_runs += 1;
        self.last_execution_time = elapsed;

        if self.execution_times.len() == EXECUTION_TIMES_WINDOW {
            self.execution_times.pop_front();
        }
        self.execution_times.push_back(elapsed);
        let sum: Duration = self.execution_times.iter().sum();
        self.average_execution_time = sum / self.execution_times.len() as u32;

        match result {
            Ok(()) => self.last_error = None,
            Err(e) => {
                self.total_errors += 1;
                self.last_error = Some(e.to_string());
            }
        }

        self.total_warnings += warnings.len() as u64;
        self.last_warnings = warnings;

        if self.total_metric_samples < TOTAL_METRIC_SAMPLES_CAP {
            let samples = metrics
                .values()
                .filter(|v| **v > 0)
                .fold(0u64, |acc, v| acc.saturating_add(*v as u64));
            self.total_metric_samples = self
                .total_metric_samples
                .saturating_add(samples)
                .min(TOTAL_METRIC_SAMPLES_CAP);
        }
        self.metric_samples = metrics;
        self.updated_at = SystemTime::now();
    }

    /// Number of successful runs.
    pub fn total_successes(&self) -> u64 {
        self.total_runs - self.total_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CheckStats {
        CheckStats::new(CheckId::new("cpu"), "cpu")
    }

    #[test]
    fn counts_errors_and_clears_last_error() {
        let mut s = entry();
        s.add(
            Duration::from_millis(10),
            &Err(CheckError::fail("boom")),
            vec![],
            HashMap::new(),
        );
        assert_eq!(s.total_runs, 1);
        assert_eq!(s.total_errors, 1);
        assert_eq!(s.last_error.as_deref(), Some("execution failed: boom"));

        s.add(Duration::from_millis(30), &Ok(()), vec![], HashMap::new());
        assert_eq!(s.total_runs, 2);
        assert_eq!(s.total_successes(), 1);
        assert!(s.last_error.is_none());
        assert_eq!(s.average_execution_time, Duration::from_millis(20));
    }

    #[test]
    fn execution_window_is_bounded() {
        let mut s = entry();
        for i in 0..(EXECUTION_TIMES_WINDOW as u64 + 8) {
            s.add(Duration::from_millis(i), &Ok(()), vec![], HashMap::new());
        }
        assert_eq!(s.execution_times.len(), EXECUTION_TIMES_WINDOW);
        assert_eq!(s.execution_times.front(), Some(&Duration::from_millis(8)));
        assert_eq!(s.last_execution_time, Duration::from_millis(39));
    }

    #[test]
    fn warnings_and_metrics_are_tracked() {
        let mut s = entry();
        let metrics = HashMap::from([("samples".to_string(), 12), ("events".to_string(), 3)]);
        s.add(
            Duration::ZERO,
            &Ok(()),
            vec!["w1".into(), "w2".into()],
            metrics,
        );
        s.add(Duration::ZERO, &Ok(()), vec![], HashMap::new());
        assert_eq!(s.total_warnings, 2);
        assert!(s.last_warnings.is_empty());
        assert_eq!(s.total_metric_samples, 15);
        assert!(s.metric_samples.is_empty());
    }

    #[test]
    fn huge_metric_samples_saturate_at_cap() {
        let mut s = entry();
        let metrics = HashMap::from([("a".to_string(), i64::MAX), ("b".to_string(), 1)]);
        s.add(Duration::ZERO, &Ok(()), vec![], metrics);
        assert_eq!(s.total_metric_samples, TOTAL_METRIC_SAMPLES_CAP);
        assert_eq!(s.total_runs, 1);
    }
}

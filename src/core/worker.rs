//! # Worker loop: drain the pending queue and execute checks.
//!
//! Every worker repeats:
//! ```text
//! loop {
//!   ├─► next() ── pending queue (suspends while empty)
//!   │     └─ queue closed & drained ─► exit
//!   ├─► registry.claim(check)
//!   │     └─ already running ─► skipped += 1, drop submission, continue
//!   ├─► decision = log_policy.decide(stats.total_runs(id))
//!   ├─► check.run(child token)            (panics are caught → Fatal)
//!   ├─► stats.record(elapsed, result, warnings, metric stats)
//!   ├─► log outcome per decision
//!   └─► registry.release(id)              (always, even if bookkeeping panicked;
//!                                          fires `finished` for stop waiters)
//! }
//! ```
//!
//! ## Rules
//! - A failed run is recorded and logged, never propagated
//! - The identity stays claimed for the whole run, including bookkeeping
//! - A panic in `run`, `warnings` or `metric_stats` is recorded as [`CheckError::Fatal`]
//! - Closing the queue lets workers drain what is already buffered

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    checks::CheckRef,
    core::{config::RunnerConfig, registry::Registry},
    error::CheckError,
    stats::{RunnerCounters, StatsStore},
};

/// State shared by the runner and all of its workers.
pub(crate) struct Shared {
    pub cfg: RunnerConfig,
    pub queue: Mutex<mpsc::Receiver<CheckRef>>,
    pub closed: CancellationToken,
    pub registry: Registry,
    pub stats: Arc<StatsStore>,
    pub counters: RunnerCounters,
}

/// Runs one worker until the queue is closed and drained.
pub(crate) async fn work(shared: Arc<Shared>, worker: usize) {
    while let Some(check) = next(&shared).await {
        execute(&shared, check).await;
    }
    debug!(worker, "worker exiting, pending queue closed");
}

/// Receives the next check; `None` once the queue is closed and empty.
async fn next(shared: &Shared) -> Option<CheckRef> {
    let mut rx = shared.queue.lock().await;
    tokio::select! {
        biased;
        msg = rx.recv() => msg,
        _ = shared.closed.cancelled() => {
            rx.close();
            rx.recv().await
        }
    }
}

/// Executes one submission of `check`, unless its identity is already running.
async fn execute(shared: &Shared, check: CheckRef) {
    let id = check.id().clone();
    let Some(token) = shared.registry.claim(&check).await else {
        shared.counters.skipped();
        debug!(check = %id, "check is already running, dropping this submission");
        return;
    };
    shared.counters.started();

    let outcome = AssertUnwindSafe(run_and_record(shared, &check, token))
        .catch_unwind()
        .await;
    if let Err(panic) = outcome {
        shared.counters.finished(true, 0);
        warn!(check = %id, panic = %panic_message(&*panic), "check bookkeeping panicked");
    }

    shared.registry.release(&id).await;
}

/// Runs the check once, records the outcome and emits the log line.
async fn run_and_record(shared: &Shared, check: &CheckRef, token: CancellationToken) {
    let id = check.id();
    let decision = shared
        .cfg
        .log_policy
        .decide(shared.stats.total_runs(id).await);
    debug!(check = %id, "running check");

    let started = Instant::now();
    let mut result = run_isolated(check, token.child_token()).await;
    let elapsed = started.elapsed();

    let warnings = catch_unwind(AssertUnwindSafe(|| check.warnings())).unwrap_or_else(|panic| {
        result = Err(fatal("warnings", &*panic));
        Vec::new()
    });
    let metrics = match catch_unwind(AssertUnwindSafe(|| check.metric_stats())) {
        Ok(Ok(metrics)) => metrics,
        Ok(Err(e)) => {
            debug!(check = %id, error = %e, "failed to collect metric stats");
            HashMap::new()
        }
        Err(panic) => {
            result = Err(fatal("metric stats", &*panic));
            HashMap::new()
        }
    };
    let warning_count = warnings.len();

    shared
        .stats
        .record(check.as_ref(), elapsed, &result, warnings, metrics)
        .await;

    match (&result, decision.log) {
        (Ok(()), true) if decision.last_of_burst => info!(
            check = %id,
            ?elapsed,
            every = shared.cfg.log_policy.periodic_interval,
            "done running check, next runs will be logged every {} runs",
            shared.cfg.log_policy.periodic_interval
        ),
        (Ok(()), true) => info!(check = %id, ?elapsed, "done running check"),
        (Err(e), true) if decision.last_of_burst => warn!(
            check = %id,
            ?elapsed,
            error = %e,
            label = e.as_label(),
            "error running check, next runs will be logged every {} runs",
            shared.cfg.log_policy.periodic_interval
        ),
        (Err(e), true) => warn!(
            check = %id,
            ?elapsed,
            error = %e,
            label = e.as_label(),
            "error running check"
        ),
        (Ok(()), false) => debug!(check = %id, ?elapsed, "done running check"),
        (Err(e), false) => debug!(check = %id, ?elapsed, error = %e, "error running check"),
    }

    shared.counters.finished(result.is_err(), warning_count);
}

/// Runs the check, turning a panic into [`CheckError::Fatal`] so the worker survives.
async fn run_isolated(check: &CheckRef, ctx: CancellationToken) -> Result<(), CheckError> {
    let fut = check.run(ctx);
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => Err(fatal("run", &*panic)),
    }
}

fn fatal(stage: &str, panic: &(dyn Any + Send)) -> CheckError {
    CheckError::Fatal {
        error: format!("check panicked in {stage}: {}", panic_message(panic)),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

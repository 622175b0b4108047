//! # Runner: bounded worker pool for checks.
//!
//! The [`Runner`] owns the pending queue, the running-check registry and a fixed set of
//! workers. The external scheduler submits checks through a [`RunnerHandle`]; operators stop
//! single checks with [`Runner::stop_check`] or the whole pool with [`Runner::shutdown`].
//!
//! ## Architecture
//! ```text
//! scheduler ──► RunnerHandle::submit() ──► [pending queue (bounded)]
//!                                                  │
//!                                ┌─────────────────┼─────────────────┐
//!                                ▼                 ▼                 ▼
//!                            worker 0          worker 1   ...    worker N-1
//!                                │ claim / run / record / log / release
//!                                ▼
//!                      Registry (id → running check)  ◄── stop_check(id)
//!                                                     ◄── shutdown()
//! ```
//!
//! ## Stop protocol
//! ```text
//! Idle ──► StopRequested ──┬─► Stopped   (worker released the id within stop_timeout)
//!   (cancel token,         └─► TimedOut  (RuntimeError::StopTimeout; check keeps running
//!    Check::stop)                         detached and leaves the registry when it returns)
//! ```
//!
//! ## Shutdown path
//! ```text
//! shutdown()
//!   ├─► close the pending queue (new submissions → SubmitError::Closed)
//!   ├─► stop every running check concurrently (each bounded by stop_timeout)
//!   └─► join workers (they drain the buffered queue first), bounded by grace:
//!          ├─ Ok (all joined)  → Ok(())
//!          └─ grace exceeded   → workers detached, RuntimeError::GraceExceeded { stuck }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    checks::{CheckId, CheckRef},
    core::{
        builder::RunnerBuilder,
        config::RunnerConfig,
        registry::Registry,
        worker::{Shared, work},
    },
    error::{RuntimeError, SubmitError},
    stats::{RunnerCounters, RunnerStats, StatsStore},
};

/// Submission endpoint of a [`Runner`].
///
/// Cheap to clone; hand one to each scheduler.
#[derive(Clone)]
pub struct RunnerHandle {
    tx: mpsc::Sender<CheckRef>,
    closed: CancellationToken,
}

impl RunnerHandle {
    /// Submits a check, waiting for queue space if the queue is full.
    ///
    /// A submission for an identity that is already running when a worker picks it up is
    /// dropped without executing.
    pub async fn submit(&self, check: CheckRef) -> Result<(), SubmitError> {
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(SubmitError::Closed),
            res = self.tx.send(check) => res.map_err(|_| SubmitError::Closed),
        }
    }

    /// Submits without waiting; fails with [`SubmitError::Full`] if the queue is full.
    pub fn try_submit(&self, check: CheckRef) -> Result<(), SubmitError> {
        if self.closed.is_cancelled() {
            return Err(SubmitError::Closed);
        }
        self.tx.try_send(check).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SubmitError::Full,
            mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
        })
    }

    /// Returns true once the runner stopped accepting submissions.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

/// Fixed-size worker pool executing submitted checks.
///
/// ### Guarantees
/// - At most one execution per [`CheckId`] at any instant
/// - Failed runs are recorded and logged; workers keep going
/// - Stop requests are cooperative and bounded by [`RunnerConfig::stop_timeout`]
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use checkrunner::{Check, CheckError, CheckFn, Runner, RunnerConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let runner = Runner::new(RunnerConfig { workers: 2, ..RunnerConfig::default() });
///
///     let check = CheckFn::arc("uptime", |_ctx: CancellationToken| async {
///         Ok::<_, CheckError>(())
///     });
///     runner.submit(check.clone()).await?;
///
///     while runner.stats().total_runs(check.id()).await == 0 {
///         tokio::time::sleep(Duration::from_millis(5)).await;
///     }
///     runner.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct Runner {
    shared: Arc<Shared>,
    handle: RunnerHandle,
    workers: Mutex<Option<JoinSet<()>>>,
    stopped: AtomicBool,
}

impl Runner {
    /// Creates a runner with a fresh statistics store and starts its workers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(cfg: RunnerConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Returns a builder for injecting collaborators (e.g. a shared [`StatsStore`]).
    pub fn builder(cfg: RunnerConfig) -> RunnerBuilder {
        RunnerBuilder::new(cfg)
    }

    /// Allocates queue and registry, then spawns the workers.
    pub(crate) fn start(cfg: RunnerConfig, stats: Arc<StatsStore>) -> Self {
        let (tx, rx) = mpsc::channel(cfg.queue_capacity_clamped());
        let closed = CancellationToken::new();
        let workers = cfg.worker_count();

        let shared = Arc::new(Shared {
            cfg,
            queue: Mutex::new(rx),
            closed: closed.clone(),
            registry: Registry::new(),
            stats,
            counters: RunnerCounters::default(),
        });
        shared.counters.set_workers(workers);

        let mut set = JoinSet::new();
        for worker in 0..workers {
            set.spawn(work(shared.clone(), worker));
        }
        debug!(workers, "check runner started");

        Self {
            shared,
            handle: RunnerHandle { tx, closed },
            workers: Mutex::new(Some(set)),
            stopped: AtomicBool::new(false),
        }
    }

    /// Returns a cloneable submission endpoint.
    pub fn handle(&self) -> RunnerHandle {
        self.handle.clone()
    }

    /// Shorthand for `handle().submit(check)`.
    pub async fn submit(&self, check: CheckRef) -> Result<(), SubmitError> {
        self.handle.submit(check).await
    }

    /// Shorthand for `handle().try_submit(check)`.
    pub fn try_submit(&self, check: CheckRef) -> Result<(), SubmitError> {
        self.handle.try_submit(check)
    }

    /// Returns true if a worker is currently executing `id`.
    pub async fn is_running(&self, id: &CheckId) -> bool {
        self.shared.registry.contains(id).await
    }

    /// Returns sorted identities currently executing.
    pub async fn running(&self) -> Vec<CheckId> {
        self.shared.registry.list().await
    }

    /// Returns the statistics store this runner records into.
    pub fn stats(&self) -> Arc<StatsStore> {
        self.shared.stats.clone()
    }

    /// Returns a snapshot of runner-wide counters.
    pub fn counters(&self) -> RunnerStats {
        self.shared.counters.snapshot()
    }

    /// Returns the configuration the runner was built with.
    pub fn config(&self) -> &RunnerConfig {
        &self.shared.cfg
    }

    /// Stops the running check `id`.
    ///
    /// - `id` not running → `Ok(())` immediately
    /// - otherwise cancels the run token, calls [`Check::stop`](crate::Check::stop) on a
    ///   blocking thread and waits up to `stop_timeout`, in total, for the hook to return and
    ///   the worker to release the identity
    /// - on expiry returns [`RuntimeError::StopTimeout`]; the check is not killed
    pub async fn stop_check(&self, id: &CheckId) -> Result<(), RuntimeError> {
        let Some(handle) = self.shared.registry.stop_handle(id).await else {
            return Ok(());
        };
        debug!(check = %id, running_for = ?handle.running_for, "stopping check");

        handle.cancel.cancel();
        let check = handle.check;
        let hook = tokio::task::spawn_blocking(move || check.stop());

        let timeout = self.shared.cfg.stop_timeout;
        let stopped = async {
            if let Err(e) = hook.await {
                warn!(check = %id, error = %e, "check stop hook failed");
            }
            handle.finished.cancelled().await;
        };
        match time::timeout(timeout, stopped).await {
            Ok(()) => {
                debug!(check = %id, "check stopped");
                Ok(())
            }
            Err(_elapsed) => {
                warn!(check = %id, ?timeout, "check did not stop in time, leaving it detached");
                Err(RuntimeError::StopTimeout { id: id.clone() })
            }
        }
    }

    /// Closes the queue, stops running checks and joins the workers.
    ///
    /// Idempotent: calls after the first return `Ok(())` immediately.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.shared.closed.cancel();

        let running = self.shared.registry.list().await;
        let results = join_all(running.iter().map(|id| self.stop_check(id))).await;
        for err in results.into_iter().filter_map(Result::err) {
            warn!(error = %err, label = err.as_label(), "check did not stop during shutdown");
        }

        let Some(mut set) = self.workers.lock().await.take() else {
            return Ok(());
        };
        let grace = self.shared.cfg.grace;
        let joined = time::timeout(grace, async {
            while set.join_next().await.is_some() {}
        })
        .await;

        match joined {
            Ok(()) => {
                info!("check runner stopped");
                Ok(())
            }
            Err(_elapsed) => {
                set.detach_all();
                let stuck = self.shared.registry.list().await;
                warn!(?grace, ?stuck, "workers did not exit within grace");
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Returns true once the pending queue is closed.
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }
}

impl Drop for Runner {
    /// Closes the queue and lets workers finish on their own.
    fn drop(&mut self) {
        self.shared.closed.cancel();
        if let Some(set) = self.workers.get_mut().as_mut() {
            set.detach_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;
    use crate::checks::{Check, CheckFn};
    use crate::error::CheckError;

    fn cfg(workers: usize) -> RunnerConfig {
        RunnerConfig {
            workers,
            stop_timeout: Duration::from_millis(200),
            grace: Duration::from_millis(500),
            ..RunnerConfig::default()
        }
    }

    /// Check that waits on its token and counts runs.
    fn blocking(id: &'static str, runs: Arc<AtomicUsize>) -> CheckRef {
        CheckFn::arc(id, move |ctx: CancellationToken| {
            let runs = runs.clone();
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                ctx.cancelled().await;
                Err(CheckError::Canceled)
            }
        })
    }

    async fn wait_until<F, Fut>(mut cond: F)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        for _ in 0..200 {
            if cond().await {
                return;
            }
            time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn new_runner_is_ready() {
        let runner = Runner::new(cfg(3));
        assert!(!runner.is_closed());
        assert!(runner.running().await.is_empty());
        assert_eq!(runner.counters().workers, 3);
        runner.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let runner = Runner::new(cfg(2));
        runner.shutdown().await.unwrap();
        assert!(runner.is_closed());
        runner.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn submissions_after_shutdown_are_rejected() {
        let runner = Runner::new(cfg(1));
        let handle = runner.handle();
        runner.shutdown().await.unwrap();

        let c: CheckRef = CheckFn::arc("late", |_ctx: CancellationToken| async {
            Ok::<_, CheckError>(())
        });
        assert_eq!(handle.submit(c.clone()).await, Err(SubmitError::Closed));
        assert_eq!(handle.try_submit(c), Err(SubmitError::Closed));
    }

    #[tokio::test]
    async fn duplicate_is_dropped_while_running() {
        let runner = Runner::new(cfg(2));
        let runs = Arc::new(AtomicUsize::new(0));
        let c = blocking("dup", runs.clone());

        runner.submit(c.clone()).await.unwrap();
        wait_until(|| runner.is_running(c.id())).await;

        runner.submit(c.clone()).await.unwrap();
        wait_until(|| async { runner.counters().skipped == 1 }).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        runner.stop_check(c.id()).await.unwrap();
        assert!(!runner.is_running(c.id()).await);
        runner.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn claimed_identity_is_never_executed_twice() {
        let runner = Runner::new(cfg(1));
        let runs = Arc::new(AtomicUsize::new(0));
        let c = blocking("faked", runs.clone());

        // Pretend a previous run is still in flight.
        runner.shared.registry.claim(&c).await.unwrap();
        runner.submit(c.clone()).await.unwrap();
        wait_until(|| async { runner.counters().skipped == 1 }).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        runner.shared.registry.release(c.id()).await;
        runner.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn stop_unknown_check_is_noop() {
        let runner = Runner::new(cfg(1));
        runner.stop_check(&CheckId::new("foo")).await.unwrap();
        runner.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn stop_invokes_check_stop_hook() {
        struct Hooked {
            id: CheckId,
            stopped: CancellationToken,
        }

        #[async_trait::async_trait]
        impl Check for Hooked {
            fn id(&self) -> &CheckId {
                &self.id
            }
            fn name(&self) -> &str {
                "hooked"
            }
            async fn run(&self, _ctx: CancellationToken) -> Result<(), CheckError> {
                // Ignores its token; only the stop hook ends the run.
                self.stopped.cancelled().await;
                Ok(())
            }
            fn stop(&self) {
                self.stopped.cancel();
            }
        }

        let runner = Runner::new(cfg(1));
        let c: CheckRef = Arc::new(Hooked {
            id: CheckId::new("hooked"),
            stopped: CancellationToken::new(),
        });
        runner.submit(c.clone()).await.unwrap();
        wait_until(|| runner.is_running(c.id())).await;

        runner.stop_check(c.id()).await.unwrap();
        let stats = runner.stats().get(c.id()).await.unwrap();
        assert_eq!(stats.total_runs, 1);
        assert_eq!(stats.total_errors, 0);
        runner.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_stops_running_checks() {
        let runner = Runner::new(cfg(2));
        let runs = Arc::new(AtomicUsize::new(0));
        let a = blocking("a", runs.clone());
        let b = blocking("b", runs.clone());
        runner.submit(a.clone()).await.unwrap();
        runner.submit(b.clone()).await.unwrap();
        wait_until(|| async { runner.running().await.len() == 2 }).await;

        runner.shutdown().await.unwrap();
        assert!(runner.running().await.is_empty());
        assert_eq!(runner.counters().runs, 2);
        assert_eq!(runner.counters().errors, 2);
    }

    #[tokio::test]
    async fn panicking_check_does_not_kill_worker() {
        let runner = Runner::new(cfg(1));
        let boom: CheckRef = CheckFn::arc("boom", |_ctx: CancellationToken| async {
            if true {
                panic!("kaboom");
            }
            Ok::<_, CheckError>(())
        });
        let ok: CheckRef = CheckFn::arc("ok", |_ctx: CancellationToken| async {
            Ok::<_, CheckError>(())
        });
        runner.submit(boom.clone()).await.unwrap();
        runner.submit(ok.clone()).await.unwrap();

        let stats = runner.stats();
        wait_until(|| {
            let stats = stats.clone();
            let id = ok.id().clone();
            async move { stats.total_runs(&id).await == 1 }
        })
        .await;

        let failed = stats.get(boom.id()).await.unwrap();
        assert_eq!(failed.total_errors, 1);
        assert!(failed.last_error.unwrap().contains("kaboom"));
        assert!(!runner.is_running(boom.id()).await);
        runner.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn panicking_warnings_release_the_identity() {
        struct PanickyWarnings {
            id: CheckId,
        }

        #[async_trait::async_trait]
        impl Check for PanickyWarnings {
            fn id(&self) -> &CheckId {
                &self.id
            }
            fn name(&self) -> &str {
                "panicky"
            }
            async fn run(&self, _ctx: CancellationToken) -> Result<(), CheckError> {
                Ok(())
            }
            fn warnings(&self) -> Vec<String> {
                panic!("warnings exploded");
            }
        }

        let runner = Runner::new(cfg(1));
        let panicky: CheckRef = Arc::new(PanickyWarnings {
            id: CheckId::new("panicky"),
        });
        let ok: CheckRef = CheckFn::arc("ok", |_ctx: CancellationToken| async {
            Ok::<_, CheckError>(())
        });
        runner.submit(panicky.clone()).await.unwrap();
        runner.submit(ok.clone()).await.unwrap();

        let stats = runner.stats();
        wait_until(|| {
            let stats = stats.clone();
            let id = ok.id().clone();
            async move { stats.total_runs(&id).await == 1 }
        })
        .await;

        assert!(!runner.is_running(panicky.id()).await);
        let failed = stats.get(panicky.id()).await.unwrap();
        assert_eq!(failed.total_errors, 1);
        assert!(failed.last_error.unwrap().contains("warnings exploded"));
        assert_eq!(runner.counters().running, 0);

        // The identity is free again: a new submission runs.
        runner.submit(panicky.clone()).await.unwrap();
        wait_until(|| {
            let stats = stats.clone();
            let id = panicky.id().clone();
            async move { stats.total_runs(&id).await == 2 }
        })
        .await;
        runner.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn blocking_stop_hook_is_bounded_by_stop_timeout() {
        struct SlowStop {
            id: CheckId,
        }

        #[async_trait::async_trait]
        impl Check for SlowStop {
            fn id(&self) -> &CheckId {
                &self.id
            }
            fn name(&self) -> &str {
                "slow-stop"
            }
            async fn run(&self, ctx: CancellationToken) -> Result<(), CheckError> {
                ctx.cancelled().await;
                Err(CheckError::Canceled)
            }
            fn stop(&self) {
                std::thread::sleep(Duration::from_secs(1));
            }
        }

        let runner = Runner::new(cfg(1));
        let c: CheckRef = Arc::new(SlowStop {
            id: CheckId::new("slow-stop"),
        });
        runner.submit(c.clone()).await.unwrap();
        wait_until(|| runner.is_running(c.id())).await;

        let started = std::time::Instant::now();
        let err = runner.stop_check(c.id()).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_millis(800));
        assert!(matches!(err, RuntimeError::StopTimeout { .. }));

        // The run itself honoured its token.
        wait_until(|| async { !runner.is_running(c.id()).await }).await;

        let started = std::time::Instant::now();
        runner.shutdown().await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(800));
    }
}

//! # Running-check registry.
//!
//! Tracks which check identities are executing right now. Workers claim an identity
//! before running a check and release it afterwards; stop requests look the identity
//! up to cancel it and wait for its release.
//!
//! ## Architecture
//! ```text
//! worker ──► claim(check) ──► Some(run token) ──► check.run(token) ──► release(id)
//!                         └─► None (already running) ──► drop submission
//!
//! stop_check(id) ──► stop_handle(id) ──► cancel token + check.stop()
//!                                    └─► wait finished (bounded)
//! ```
//!
//! ## Rules
//! - An identity is present **iff** a worker is inside that check's execution
//! - `claim` is check-and-insert under a single write lock (no two owners)
//! - `release` fires the entry's `finished` latch, waking every stop waiter

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::checks::{CheckId, CheckRef};

/// Bookkeeping for one executing check.
struct Entry {
    /// The check instance being executed.
    check: CheckRef,
    /// Token handed to `Check::run`; cancelled on stop.
    cancel: CancellationToken,
    /// One-shot latch fired when the worker releases the identity.
    finished: CancellationToken,
    /// When the worker claimed the identity.
    started_at: Instant,
}

/// Everything a stop request needs, detached from the registry lock.
pub(crate) struct StopHandle {
    pub check: CheckRef,
    pub cancel: CancellationToken,
    pub finished: CancellationToken,
    pub running_for: Duration,
}

/// Concurrency-safe map of identity → executing check.
#[derive(Default)]
pub(crate) struct Registry {
    running: RwLock<HashMap<CheckId, Entry>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `check`'s identity.
    ///
    /// Returns the run token, or `None` if the identity is already claimed.
    pub async fn claim(&self, check: &CheckRef) -> Option<CancellationToken> {
        let mut running = self.running.write().await;
        if running.contains_key(check.id()) {
            return None;
        }
        let cancel = CancellationToken::new();
        running.insert(
            check.id().clone(),
            Entry {
                check: check.clone(),
                cancel: cancel.clone(),
                finished: CancellationToken::new(),
                started_at: Instant::now(),
            },
        );
        Some(cancel)
    }

    /// Releases `id` and wakes stop waiters.
    pub async fn release(&self, id: &CheckId) {
        let entry = self.running.write().await.remove(id);
        if let Some(entry) = entry {
            entry.finished.cancel();
        }
    }

    /// Returns stop handles for `id` if it is running.
    pub async fn stop_handle(&self, id: &CheckId) -> Option<StopHandle> {
        self.running.read().await.get(id).map(|e| StopHandle {
            check: e.check.clone(),
            cancel: e.cancel.clone(),
            finished: e.finished.clone(),
            running_for: e.started_at.elapsed(),
        })
    }

    /// Returns true if `id` is executing.
    pub async fn contains(&self, id: &CheckId) -> bool {
        self.running.read().await.contains_key(id)
    }

    /// Returns sorted identities currently executing.
    pub async fn list(&self) -> Vec<CheckId> {
        let running = self.running.read().await;
        let mut ids: Vec<CheckId> = running.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::checks::CheckFn;
    use crate::error::CheckError;

    fn check(id: &'static str) -> CheckRef {
        CheckFn::arc(id, |_ctx: CancellationToken| async {
            Ok::<_, CheckError>(())
        })
    }

    #[tokio::test]
    async fn claim_is_exclusive_until_release() {
        let reg = Registry::new();
        let a = check("a");

        assert!(reg.claim(&a).await.is_some());
        assert!(reg.claim(&a).await.is_none());
        assert!(reg.contains(a.id()).await);

        reg.release(a.id()).await;
        assert!(!reg.contains(a.id()).await);
        assert!(reg.claim(&a).await.is_some());
    }

    #[tokio::test]
    async fn concurrent_claims_have_one_winner() {
        let reg = Arc::new(Registry::new());
        let a = check("a");

        let mut joins = Vec::new();
        for _ in 0..16 {
            let reg = reg.clone();
            let a = a.clone();
            joins.push(tokio::spawn(async move { reg.claim(&a).await.is_some() }));
        }
        let mut winners = 0;
        for j in joins {
            if j.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn release_fires_finished_latch() {
        let reg = Registry::new();
        let a = check("a");
        let token = reg.claim(&a).await.unwrap();

        let handle = reg.stop_handle(a.id()).await.unwrap();
        handle.cancel.cancel();
        assert!(token.is_cancelled());
        assert!(!handle.finished.is_cancelled());

        reg.release(a.id()).await;
        assert!(handle.finished.is_cancelled());
        assert!(reg.stop_handle(a.id()).await.is_none());
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let reg = Registry::new();
        reg.claim(&check("b")).await;
        reg.claim(&check("a")).await;
        assert_eq!(reg.list().await, vec![CheckId::new("a"), CheckId::new("b")]);
    }
}

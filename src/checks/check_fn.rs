//! # Function-backed check (`CheckFn`)
//!
//! [`CheckFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a fresh
//! future per run. There is no hidden state shared between runs; if a check needs
//! state across runs, capture an `Arc<...>` explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use checkrunner::{Check, CheckError, CheckFn, CheckRef};
//!
//! let c: CheckRef = CheckFn::arc("load", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(CheckError::Canceled);
//!     }
//!     Ok(())
//! });
//!
//! assert_eq!(c.id().as_str(), "load");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::checks::{Check, CheckId};
use crate::error::CheckError;

/// Function-backed check implementation.
#[derive(Debug)]
pub struct CheckFn<F> {
    id: CheckId,
    name: Cow<'static, str>,
    interval: Duration,
    f: F,
}

impl<F> CheckFn<F> {
    /// Creates a check whose name and identity are both `id`.
    ///
    /// Prefer [`CheckFn::arc`] when you immediately need a [`CheckRef`](crate::CheckRef).
    pub fn new(id: impl Into<Cow<'static, str>>, f: F) -> Self {
        let name = id.into();
        Self {
            id: CheckId::new(name.to_string()),
            name,
            interval: Duration::from_secs(15),
            f,
        }
    }

    /// Creates the check and returns it as a shared handle.
    pub fn arc(id: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(id, f))
    }

    /// Overrides the identity (e.g. with one from [`CheckId::from_config`]).
    pub fn with_id(mut self, id: CheckId) -> Self {
        self.id = id;
        self
    }

    /// Overrides the reported run interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

#[async_trait]
impl<F, Fut> Check for CheckFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CheckError>> + Send + 'static,
{
    fn id(&self) -> &CheckId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), CheckError> {
        (self.f)(ctx).await
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}

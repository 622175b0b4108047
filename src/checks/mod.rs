//! # Check abstractions.
//!
//! This module provides the check-related types:
//! - [`Check`] - trait every unit of recurring work implements
//! - [`CheckFn`] - closure-backed check implementation
//! - [`CheckRef`] - shared reference to a check (`Arc<dyn Check>`)
//! - [`CheckId`] - stable identity used for de-duplication and targeted stop

mod check;
mod check_fn;
mod id;

pub use check::{Check, CheckRef};
pub use check_fn::CheckFn;
pub use id::CheckId;

//! # Check identity.
//!
//! A [`CheckId`] names one configured check instance. Two instances of the same
//! integration with different configuration get different ids:
//!
//! ```text
//! CheckId::from_config("disk", instance, init_config)  →  "disk:5d1c0f7a9e2b4c31"
//!                       name  └──── sha256(instance ‖ init_config)[..8] as hex
//! ```

use std::borrow::Borrow;
use std::fmt;

use sha2::{Digest, Sha256};

/// Stable identity of a check instance.
///
/// Used as the registry key (de-duplication, targeted stop) and as the statistics key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckId(String);

impl CheckId {
    /// Wraps an already computed identity.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derives an identity from a check name and its configuration.
    ///
    /// Deterministic: the same inputs always produce the same id.
    ///
    /// # Example
    /// ```
    /// use checkrunner::CheckId;
    ///
    /// let a = CheckId::from_config("disk", "path: /", "");
    /// let b = CheckId::from_config("disk", "path: /", "");
    /// let c = CheckId::from_config("disk", "path: /var", "");
    /// assert_eq!(a, b);
    /// assert_ne!(a, c);
    /// assert!(a.as_str().starts_with("disk:"));
    /// ```
    pub fn from_config(name: &str, instance: &str, init_config: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(instance.as_bytes());
        hasher.update(init_config.as_bytes());
        let digest = hasher.finalize();
        Self(format!("{name}:{}", hex::encode(&digest[..8])))
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CheckId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CheckId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for CheckId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

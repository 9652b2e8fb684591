//! Sensitive data marker for automatic redaction
//!
//! The `Sensitive<T>` wrapper keeps secrets (passwords, tokens, API keys)
//! out of captured object dumps, diffs and log lines. Debug, Display and
//! Serialize all produce [`REDACTED`], and the capture engine renders it
//! as the same placeholder text.

use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder emitted in place of a sensitive value
pub const REDACTED: &str = "***REDACTED***";

/// Wrapper for sensitive data that redacts itself wherever it is rendered
///
/// # Example
///
/// ```
/// use valuelog_core_types::Sensitive;
///
/// let token = Sensitive::new("secret123");
/// assert_eq!(format!("{:?}", token), "***REDACTED***");
/// assert_eq!(token.expose(), &"secret123");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Transform the wrapped value without exposing it
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sensitive<U> {
        Sensitive(f(self.0))
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> Serialize for Sensitive<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

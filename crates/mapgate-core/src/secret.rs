//! Credential wrapper.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A Maps API key, zeroed on drop and redacted when formatted.
///
/// Bearer credentials bound to sessions and the process-wide `NS_API_KEY`
/// are both carried in this type, so logging a context or a store never
/// leaks a key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// The raw key, for the outbound request only.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    /// Empty or whitespace only. A blank key counts as no key.
    pub fn is_blank(&self) -> bool {
        self.inner.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

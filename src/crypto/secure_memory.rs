//! Secure memory handling for sensitive data
//!
//! Holds passphrases and composite unlock secrets in a string that zeros its
//! contents on drop, so secrets do not linger in freed memory.

use std::fmt;
use zeroize::Zeroizing;

/// A string type that zeros its contents on drop
///
/// Use this for passphrases, PINs, and the composite linked-identity secret.
pub struct SecretString {
    inner: Zeroizing<String>,
}

impl SecretString {
    /// Create a new SecretString
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            inner: Zeroizing::new(s.into()),
        }
    }

    /// Expose the secret for key derivation
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([redacted])")
    }
}

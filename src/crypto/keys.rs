//! Key material handling
//!
//! The data key is the only thing that can decrypt vault content. It exists
//! exclusively in memory for the lifetime of an unlocked session: it cannot
//! be cloned, copied, or serialized, and its bytes are zeroed on drop.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// The symmetric key that directly encrypts vault content
///
/// Owned by the unlocked session and discarded on lock. Deliberately not
/// `Clone`, `Copy`, `Serialize`, or `Debug`-printable.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_SIZE]);

impl DataKey {
    /// Generate a fresh random data key
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Reconstruct a data key from unwrapped raw bytes
    pub(crate) fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Key bytes, crate-internal only
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DataKey([redacted])")
    }
}

/// A key derived from a user secret, used only to wrap/unwrap the data key
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct WrappingKey([u8; KEY_SIZE]);

impl WrappingKey {
    /// Derive the wrapping key via PBKDF2-HMAC-SHA256
    ///
    /// The iteration count must come from the envelope being unlocked, not a
    /// compile-time constant, so vaults created under different KDF
    /// parameters remain unlockable.
    pub fn derive(secret: &str, salt: &[u8], iterations: u32) -> Self {
        let mut key = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, iterations, &mut key);
        Self(key)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keys_differ() {
        let a = DataKey::generate();
        let b = DataKey::generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_derive_is_deterministic() {
        let salt = [7u8; 16];
        let a = WrappingKey::derive("secret", &salt, 1000);
        let b = WrappingKey::derive("secret", &salt, 1000);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_derive_varies_with_inputs() {
        let salt = [7u8; 16];
        let base = WrappingKey::derive("secret", &salt, 1000);
        assert_ne!(
            base.as_bytes(),
            WrappingKey::derive("other", &salt, 1000).as_bytes()
        );
        assert_ne!(
            base.as_bytes(),
            WrappingKey::derive("secret", &[8u8; 16], 1000).as_bytes()
        );
        assert_ne!(
            base.as_bytes(),
            WrappingKey::derive("secret", &salt, 1001).as_bytes()
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = DataKey::generate();
        assert_eq!(format!("{:?}", key), "DataKey([redacted])");
    }
}

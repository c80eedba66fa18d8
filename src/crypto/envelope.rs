//! Key envelope: the vault's trust root
//!
//! The envelope wraps the data key under a key derived from the user secret
//! and records every parameter needed to re-derive that wrapping key later.
//! Unlock is the system's sole gate against unauthorized decryption: if the
//! AES-GCM tag does not verify, no key material is produced.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{CofferError, CofferResult};

use super::keys::{DataKey, WrappingKey, KEY_SIZE};
use super::payload::IV_SIZE;
use super::secure_memory::SecretString;

/// PBKDF2-HMAC-SHA256 iteration count for newly created envelopes
///
/// Stored in the envelope; unlock always reads the stored count so that
/// vaults created under other parameters keep working.
pub const PBKDF2_ITERATIONS: u32 = 310_000;

/// Size of the KDF salt in bytes
pub const SALT_SIZE: usize = 16;

const ALGORITHM: &str = "AES-GCM";

/// The wrapped data key plus the parameters to re-derive its wrapping key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEnvelope {
    /// The identity this vault belongs to
    pub owner_id: String,
    /// KDF salt (base64)
    pub salt: String,
    /// IV used to wrap the data key (base64)
    pub iv: String,
    /// The data key, encrypted under the wrapping key (base64)
    pub wrapped_data_key: String,
    /// Wrapping algorithm tag
    pub algorithm: String,
    /// PBKDF2 iteration count this envelope was created with
    pub kdf_iterations: u32,
}

impl KeyEnvelope {
    /// Create a new envelope and its data key
    ///
    /// Generates a random salt and IV, derives the wrapping key from the
    /// secret, generates a fresh 256-bit data key, and wraps it.
    pub fn create(owner_id: &str, secret: &SecretString) -> CofferResult<(Self, DataKey)> {
        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        let mut iv = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut iv);

        let wrapping_key = WrappingKey::derive(secret.expose(), &salt, PBKDF2_ITERATIONS);
        let data_key = DataKey::generate();

        let cipher = Aes256Gcm::new_from_slice(wrapping_key.as_bytes())
            .map_err(|e| CofferError::Crypto(format!("failed to create cipher: {}", e)))?;
        let wrapped = cipher
            .encrypt(Nonce::from_slice(&iv), data_key.as_bytes().as_slice())
            .map_err(|e| CofferError::Crypto(format!("failed to wrap data key: {}", e)))?;

        let envelope = Self {
            owner_id: owner_id.to_string(),
            salt: STANDARD.encode(salt),
            iv: STANDARD.encode(iv),
            wrapped_data_key: STANDARD.encode(wrapped),
            algorithm: ALGORITHM.to_string(),
            kdf_iterations: PBKDF2_ITERATIONS,
        };
        Ok((envelope, data_key))
    }

    /// Unlock the envelope, recovering the data key
    ///
    /// Fails with [`CofferError::Authentication`] when the secret is wrong;
    /// verification failure yields no key material at all.
    pub fn unlock(&self, secret: &SecretString) -> CofferResult<DataKey> {
        if self.algorithm != ALGORITHM {
            return Err(CofferError::Crypto(format!(
                "unsupported envelope algorithm: {}",
                self.algorithm
            )));
        }

        let salt = STANDARD
            .decode(&self.salt)
            .map_err(|e| CofferError::corrupted(format!("invalid envelope salt: {}", e)))?;
        let iv = STANDARD
            .decode(&self.iv)
            .map_err(|e| CofferError::corrupted(format!("invalid envelope IV: {}", e)))?;
        let wrapped = STANDARD
            .decode(&self.wrapped_data_key)
            .map_err(|e| CofferError::corrupted(format!("invalid wrapped key: {}", e)))?;

        // The stored iteration count governs derivation, never the constant.
        let wrapping_key = WrappingKey::derive(secret.expose(), &salt, self.kdf_iterations);

        let cipher = Aes256Gcm::new_from_slice(wrapping_key.as_bytes())
            .map_err(|e| CofferError::Crypto(format!("failed to create cipher: {}", e)))?;
        let raw = cipher
            .decrypt(Nonce::from_slice(&iv), wrapped.as_ref())
            .map_err(|_| CofferError::Authentication)?;

        let bytes: [u8; KEY_SIZE] = raw
            .try_into()
            .map_err(|_| CofferError::corrupted("unwrapped key has wrong length"))?;
        Ok(DataKey::from_bytes(bytes))
    }
}

/// Build the composite secret for identity-provider unlock
///
/// `"<scheme>:<subject>:<pin>"` is deterministic, so the same subject and PIN
/// always re-derive the same wrapping key with no provider-side key storage.
pub fn linked_secret(scheme: &str, subject: &str, pin: &str) -> SecretString {
    SecretString::new(format!("{}:{}:{}", scheme, subject, pin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_unlock() {
        let secret = SecretString::new("correct horse");
        let (envelope, key) = KeyEnvelope::create("user-1", &secret).unwrap();

        assert_eq!(envelope.algorithm, "AES-GCM");
        assert_eq!(envelope.kdf_iterations, PBKDF2_ITERATIONS);

        let unlocked = envelope.unlock(&secret).unwrap();
        assert_eq!(unlocked.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_wrong_secret_is_authentication_error() {
        let (envelope, _key) = KeyEnvelope::create("user-1", &SecretString::new("right")).unwrap();
        let err = envelope.unlock(&SecretString::new("wrong")).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn test_unlock_honors_stored_iteration_count() {
        let secret = SecretString::new("pw");
        let (mut envelope, _key) = KeyEnvelope::create("user-1", &secret).unwrap();

        // An envelope claiming a different KDF cost must fail cleanly rather
        // than unlock against the compiled-in constant.
        envelope.kdf_iterations = 1_000;
        let err = envelope.unlock(&secret).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn test_linked_secret_composition() {
        let secret = linked_secret("google", "sub-123", "482913");
        assert_eq!(secret.expose(), "google:sub-123:482913");
    }

    #[test]
    fn test_linked_secret_determinism() {
        let (envelope, _) =
            KeyEnvelope::create("user-1", &linked_secret("google", "sub-a", "111111")).unwrap();

        // Same subject + PIN re-derives; changing either fails to unlock.
        assert!(envelope
            .unlock(&linked_secret("google", "sub-a", "111111"))
            .is_ok());
        assert!(envelope
            .unlock(&linked_secret("google", "sub-a", "222222"))
            .unwrap_err()
            .is_authentication());
        assert!(envelope
            .unlock(&linked_secret("google", "sub-b", "111111"))
            .unwrap_err()
            .is_authentication());
    }

    #[test]
    fn test_envelope_serde_roundtrip() {
        let (envelope, _) = KeyEnvelope::create("user-1", &SecretString::new("pw")).unwrap();
        let json = serde_json::to_string(&envelope).unwrap();
        let back: KeyEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }
}

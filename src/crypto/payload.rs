//! AES-256-GCM payload codec
//!
//! Encrypts any serializable value under the data key. Each call generates a
//! fresh random IV; IVs are never reused under the same key. Ciphertext and
//! IV travel as base64 strings so blobs can live in JSON records verbatim.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{CofferError, CofferResult};

use super::keys::DataKey;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// An encrypted payload with its IV, both base64 encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    pub ciphertext: String,
    pub iv: String,
}

impl EncryptedBlob {
    fn decode_iv(&self) -> CofferResult<Vec<u8>> {
        let iv = STANDARD
            .decode(&self.iv)
            .map_err(|e| CofferError::corrupted(format!("invalid IV encoding: {}", e)))?;
        if iv.len() != IV_SIZE {
            return Err(CofferError::corrupted(format!(
                "invalid IV size: expected {}, got {}",
                IV_SIZE,
                iv.len()
            )));
        }
        Ok(iv)
    }

    fn decode_ciphertext(&self) -> CofferResult<Vec<u8>> {
        STANDARD
            .decode(&self.ciphertext)
            .map_err(|e| CofferError::corrupted(format!("invalid ciphertext encoding: {}", e)))
    }
}

fn cipher(key: &DataKey) -> CofferResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CofferError::Crypto(format!("failed to create cipher: {}", e)))
}

/// Encrypt a serializable value under the data key
pub fn encrypt_payload<T: Serialize>(key: &DataKey, value: &T) -> CofferResult<EncryptedBlob> {
    let plaintext = serde_json::to_vec(value)?;

    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    let ciphertext = cipher(key)?
        .encrypt(nonce, plaintext.as_ref())
        .map_err(|e| CofferError::Crypto(format!("encryption failed: {}", e)))?;

    Ok(EncryptedBlob {
        ciphertext: STANDARD.encode(ciphertext),
        iv: STANDARD.encode(iv),
    })
}

/// Decrypt a payload back into structured data
///
/// Both an AES-GCM authentication failure and syntactically invalid decrypted
/// bytes surface as [`CofferError::Corruption`]: the blob cannot be trusted
/// either way. A wrong *secret* is caught earlier, at envelope unlock.
pub fn decrypt_payload<T: DeserializeOwned>(
    key: &DataKey,
    blob: &EncryptedBlob,
) -> CofferResult<T> {
    let iv = blob.decode_iv()?;
    let nonce = Nonce::from_slice(&iv);
    let ciphertext = blob.decode_ciphertext()?;

    let plaintext = cipher(key)?
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|_| CofferError::corrupted("authentication tag mismatch"))?;

    serde_json::from_slice(&plaintext)
        .map_err(|e| CofferError::corrupted(format!("decrypted payload is not valid JSON: {}", e)))
}

//! Cryptographic core of the vault
//!
//! Provides the key envelope (PBKDF2-wrapped data key), the AES-256-GCM
//! payload codec, and secure in-memory key/secret handling.

pub mod envelope;
pub mod keys;
pub mod payload;
pub mod secure_memory;

pub use envelope::{linked_secret, KeyEnvelope, PBKDF2_ITERATIONS, SALT_SIZE};
pub use keys::DataKey;
pub use payload::{decrypt_payload, encrypt_payload, EncryptedBlob, IV_SIZE};
pub use secure_memory::SecretString;

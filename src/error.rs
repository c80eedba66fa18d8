//! Custom error types for the coffer vault engine
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for coffer operations
#[derive(Error, Debug)]
pub enum CofferError {
    /// Wrong secret at unlock; no key material was produced
    #[error("Authentication failed: could not unlock vault")]
    Authentication,

    /// Decrypted bytes are not valid structured data (wrong data or tampering)
    #[error("Vault data corrupted: {0}")]
    Corruption(String),

    /// Neither a remote nor a local copy of the vault exists
    #[error("No vault found for this account")]
    VaultNotFound,

    /// AI provider call failed (network, HTTP status, missing configuration)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Malformed or out-of-domain data from an external collaborator
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cryptographic primitive failure outside of authentication
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Remote backup store errors
    #[error("Remote store error: {0}")]
    Remote(String),

    /// Local storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl CofferError {
    /// Create a corruption error for a specific shard or blob
    pub fn corrupted(what: impl Into<String>) -> Self {
        Self::Corruption(what.into())
    }

    /// Check if this is an authentication failure
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }

    /// Check if this is a corruption error
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption(_))
    }

    /// Check if this error means no vault exists yet
    pub fn is_vault_not_found(&self) -> bool {
        matches!(self, Self::VaultNotFound)
    }

    /// Check if this is a (non-fatal) provider error
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for CofferError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CofferError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for CofferError {
    fn from(err: reqwest::Error) -> Self {
        Self::Provider(err.to_string())
    }
}

/// Result type alias for coffer operations
pub type CofferResult<T> = Result<T, CofferError>;

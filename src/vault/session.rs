//! The unlocked session
//!
//! A session is the only place the data key lives. Every vault operation
//! borrows the session; locking (dropping) it zeroizes the key. The user
//! profile is the only part cached on disk between sessions, and it never
//! contains key material.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::crypto::DataKey;
use crate::models::{Transaction, TransactionId};

use super::record::UnlockedVault;

/// How the vault secret is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Raw passphrase
    #[default]
    Password,
    /// Identity-provider subject combined with a PIN
    Linked,
}

/// The signed-in user's identity (no secrets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub auth_method: AuthMethod,
}

/// An unlocked vault session
///
/// Owns the data key exclusively; not `Clone`, so no second copy of the key
/// can escape the session's lifetime.
pub struct Session {
    pub profile: UserProfile,
    pub vault: UnlockedVault,
    /// Decrypted transactions, newest first
    pub transactions: Vec<Transaction>,
    key: DataKey,
}

impl Session {
    pub fn new(
        profile: UserProfile,
        vault: UnlockedVault,
        transactions: Vec<Transaction>,
        key: DataKey,
    ) -> Self {
        Self {
            profile,
            vault,
            transactions,
            key,
        }
    }

    /// Borrow the data key for a crypto operation
    pub fn key(&self) -> &DataKey {
        &self.key
    }

    /// IDs of every transaction currently in the vault, for de-duplication
    pub fn known_transaction_ids(&self) -> HashSet<TransactionId> {
        self.transactions.iter().map(|t| t.id.clone()).collect()
    }

    /// Destroy the session; the data key is zeroized on drop
    pub fn lock(self) {}
}

// The data key's own Debug is already redacting; summarize the rest.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("profile", &self.profile)
            .field("transactions", &self.transactions.len())
            .field("key", &self.key)
            .finish()
    }
}

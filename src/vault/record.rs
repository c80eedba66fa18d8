//! Persisted vault shapes and the legacy migration path
//!
//! The durable form of a vault is [`VaultRecord`]: envelope, shards, and one
//! encrypted metadata blob. Nothing else ever reaches disk or the remote
//! store. Records written before encrypted-metadata support carried the
//! metadata fields as plaintext; loading normalizes both shapes into
//! [`LoadedVault`] before anything else touches them, and the next persist
//! rewrites them sealed.

use serde::{Deserialize, Serialize};

use crate::crypto::{decrypt_payload, encrypt_payload, DataKey, EncryptedBlob, KeyEnvelope};
use crate::error::CofferResult;
use crate::models::{
    AiSettings, BankAccount, BudgetTarget, CategorizationRule, Category, FamilyMember,
    VaultMetadata,
};

use super::shards::VaultShard;

/// The sealed, durable form of a vault
///
/// This struct is the enforcement point of the never-plaintext-on-disk
/// invariant: it has no fields that could hold plaintext metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub envelope: KeyEnvelope,
    #[serde(default)]
    pub shards: Vec<VaultShard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_metadata: Option<EncryptedBlob>,
}

/// The in-memory, unlocked form of a vault (metadata in plaintext)
#[derive(Debug, Clone, PartialEq)]
pub struct UnlockedVault {
    pub envelope: KeyEnvelope,
    pub shards: Vec<VaultShard>,
    pub metadata: VaultMetadata,
}

impl UnlockedVault {
    /// Re-encrypt the metadata aggregate and produce the sealed record
    pub fn seal(&self, key: &DataKey) -> CofferResult<VaultRecord> {
        let blob = encrypt_payload(key, &self.metadata)?;
        Ok(VaultRecord {
            envelope: self.envelope.clone(),
            shards: self.shards.clone(),
            encrypted_metadata: Some(blob),
        })
    }
}

/// On-disk shape, tolerant of the legacy plaintext-metadata layout
///
/// Deserialize-only: persisting always goes through [`VaultRecord`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredVaultRecord {
    envelope: KeyEnvelope,
    #[serde(default)]
    shards: Vec<VaultShard>,
    #[serde(default)]
    encrypted_metadata: Option<EncryptedBlob>,

    // Legacy plaintext metadata fields; present only in pre-sealing records.
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    budgets: Vec<BudgetTarget>,
    #[serde(default)]
    rules: Vec<CategorizationRule>,
    #[serde(default)]
    linked_accounts: Vec<BankAccount>,
    #[serde(default)]
    family_members: Vec<FamilyMember>,
    #[serde(default)]
    ai_settings: Option<AiSettings>,
}

/// A loaded vault, normalized into exactly one of the two known shapes
#[derive(Debug)]
pub enum LoadedVault {
    /// Current shape: metadata sealed in an encrypted blob
    Sealed {
        envelope: KeyEnvelope,
        shards: Vec<VaultShard>,
        encrypted_metadata: EncryptedBlob,
    },
    /// Legacy shape: plaintext metadata, migrated on next persist
    Legacy {
        envelope: KeyEnvelope,
        shards: Vec<VaultShard>,
        metadata: VaultMetadata,
    },
}

impl LoadedVault {
    /// The key envelope, needed before anything can be decrypted
    pub fn envelope(&self) -> &KeyEnvelope {
        match self {
            Self::Sealed { envelope, .. } | Self::Legacy { envelope, .. } => envelope,
        }
    }

    /// Whether this vault still needs the encrypted-metadata migration
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy { .. })
    }

    /// Decrypt (or pass through) the metadata, yielding the unlocked vault
    pub fn hydrate(self, key: &DataKey) -> CofferResult<UnlockedVault> {
        match self {
            Self::Sealed {
                envelope,
                shards,
                encrypted_metadata,
            } => {
                let metadata: VaultMetadata = decrypt_payload(key, &encrypted_metadata)?;
                Ok(UnlockedVault {
                    envelope,
                    shards,
                    metadata,
                })
            }
            Self::Legacy {
                envelope,
                shards,
                metadata,
            } => Ok(UnlockedVault {
                envelope,
                shards,
                metadata,
            }),
        }
    }
}

impl From<StoredVaultRecord> for LoadedVault {
    fn from(raw: StoredVaultRecord) -> Self {
        match raw.encrypted_metadata {
            Some(blob) => Self::Sealed {
                envelope: raw.envelope,
                shards: raw.shards,
                encrypted_metadata: blob,
            },
            None => Self::Legacy {
                envelope: raw.envelope,
                shards: raw.shards,
                metadata: VaultMetadata {
                    categories: raw.categories,
                    budgets: raw.budgets,
                    rules: raw.rules,
                    linked_accounts: raw.linked_accounts,
                    family_members: raw.family_members,
                    ai_settings: raw.ai_settings,
                },
            },
        }
    }
}

impl From<VaultRecord> for LoadedVault {
    fn from(record: VaultRecord) -> Self {
        match record.encrypted_metadata {
            Some(blob) => Self::Sealed {
                envelope: record.envelope,
                shards: record.shards,
                encrypted_metadata: blob,
            },
            // A sealed record without a blob only occurs for vaults that
            // never persisted metadata; treat it as empty legacy metadata.
            None => Self::Legacy {
                envelope: record.envelope,
                shards: record.shards,
                metadata: VaultMetadata::default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecretString;
    use crate::models::default_categories;
    use chrono::Utc;

    fn unlocked() -> (UnlockedVault, DataKey) {
        let (envelope, key) =
            KeyEnvelope::create("user-1", &SecretString::new("pw")).unwrap();
        let vault = UnlockedVault {
            envelope,
            shards: Vec::new(),
            metadata: VaultMetadata::bootstrap(Utc::now()),
        };
        (vault, key)
    }

    #[test]
    fn test_seal_then_hydrate_roundtrip() {
        let (vault, key) = unlocked();
        let record = vault.seal(&key).unwrap();
        assert!(record.encrypted_metadata.is_some());

        let loaded: LoadedVault = record.into();
        assert!(!loaded.is_legacy());
        let back = loaded.hydrate(&key).unwrap();
        assert_eq!(back.metadata, vault.metadata);
    }

    #[test]
    fn test_sealed_record_serializes_no_plaintext_fields() {
        let (vault, key) = unlocked();
        let record = vault.seal(&key).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        let obj = json.as_object().unwrap();
        for field in [
            "categories",
            "budgets",
            "rules",
            "linkedAccounts",
            "familyMembers",
            "aiSettings",
        ] {
            assert!(!obj.contains_key(field), "plaintext field {} persisted", field);
        }
        assert!(obj.contains_key("envelope"));
        assert!(obj.contains_key("shards"));
        assert!(obj.contains_key("encryptedMetadata"));
    }

    #[test]
    fn test_legacy_record_hydrates_plaintext_fields() {
        let (envelope, key) =
            KeyEnvelope::create("user-1", &SecretString::new("pw")).unwrap();
        let legacy_json = serde_json::json!({
            "envelope": envelope,
            "shards": [],
            "categories": default_categories(),
            "budgets": [],
            "rules": [],
            "linkedAccounts": [],
            "familyMembers": [],
        });

        let raw: StoredVaultRecord = serde_json::from_value(legacy_json).unwrap();
        let loaded: LoadedVault = raw.into();
        assert!(loaded.is_legacy());

        let vault = loaded.hydrate(&key).unwrap();
        assert_eq!(vault.metadata.categories, default_categories());

        // Migration completes on the next seal.
        let migrated = vault.seal(&key).unwrap();
        assert!(migrated.encrypted_metadata.is_some());
    }

    #[test]
    fn test_hydrate_with_wrong_key_is_corruption() {
        let (vault, key) = unlocked();
        let record = vault.seal(&key).unwrap();
        let loaded: LoadedVault = record.into();

        let err = loaded.hydrate(&DataKey::generate()).unwrap_err();
        assert!(err.is_corruption());
    }
}

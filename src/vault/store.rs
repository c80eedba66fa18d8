//! Vault persistence and reconciliation
//!
//! Owns the local on-disk record and the push/pull protocol against the
//! remote backup store. The unlock ordering is remote first (the backup is
//! the source of truth on multi-device unlock), local cache second, and
//! `VaultNotFound` when neither exists.

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::CofferPaths;
use crate::crypto::{DataKey, KeyEnvelope, SecretString};
use crate::error::{CofferError, CofferResult};
use crate::models::VaultMetadata;

use super::file_io::{read_json_opt, remove_if_exists, write_json_atomic};
use super::record::{LoadedVault, StoredVaultRecord, UnlockedVault};
use super::remote::{RemoteStore, RemoteVaultRecord};
use super::session::{Session, UserProfile};
use super::shards::decrypt_all_transactions;

/// Local persistence plus remote reconciliation for one vault
pub struct VaultStore {
    paths: CofferPaths,
    remote: Option<Box<dyn RemoteStore>>,
}

impl VaultStore {
    /// Create a local-only store
    pub fn new(paths: CofferPaths) -> Self {
        Self {
            paths,
            remote: None,
        }
    }

    /// Create a store backed by a remote backup
    pub fn with_remote(paths: CofferPaths, remote: Box<dyn RemoteStore>) -> Self {
        Self {
            paths,
            remote: Some(remote),
        }
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &CofferPaths {
        &self.paths
    }

    /// Create a brand-new vault for this profile and return its session
    ///
    /// Seeds default metadata, persists locally, and pushes to the remote
    /// backup when one is configured (push failure is non-fatal; the local
    /// copy is authoritative until the next successful sync).
    pub async fn create_vault(
        &self,
        profile: UserProfile,
        secret: &SecretString,
    ) -> CofferResult<Session> {
        let (envelope, key) = KeyEnvelope::create(&profile.user_id, secret)?;
        let vault = UnlockedVault {
            envelope,
            shards: Vec::new(),
            metadata: VaultMetadata::bootstrap(Utc::now()),
        };

        self.save_profile(&profile)?;
        self.persist_local(&vault, &key)?;
        if let Err(e) = self.push(&vault, &key).await {
            warn!(error = %e, "initial remote push failed; staying on local copy");
        }

        Ok(Session::new(profile, vault, Vec::new(), key))
    }

    /// Unlock an existing vault
    ///
    /// Pulls the remote record first; on remote failure or absence, falls
    /// back to the local cache. After a successful remote unlock the record
    /// is re-cached locally for offline access.
    pub async fn unlock(
        &self,
        profile: UserProfile,
        secret: &SecretString,
    ) -> CofferResult<Session> {
        let (loaded, from_remote) = self.fetch_latest(&profile.user_id).await?;

        let key = loaded.envelope().unlock(secret)?;
        let was_legacy = loaded.is_legacy();
        let vault = loaded.hydrate(&key)?;
        let transactions = decrypt_all_transactions(&vault.shards, &key)?;

        // Re-cache a remote record, and rewrite legacy records sealed.
        if from_remote || was_legacy {
            self.persist_local(&vault, &key)?;
        }
        self.save_profile(&profile)?;

        Ok(Session::new(profile, vault, transactions, key))
    }

    /// Remote-first record fetch; `bool` reports whether the remote copy won
    async fn fetch_latest(&self, owner_id: &str) -> CofferResult<(LoadedVault, bool)> {
        if let Some(remote) = &self.remote {
            match remote.pull(owner_id).await {
                Ok(Some(record)) => {
                    debug!(owner = owner_id, "using remote vault record");
                    return Ok((record.record.into(), true));
                }
                Ok(None) => debug!(owner = owner_id, "no remote record; trying local"),
                Err(e) => warn!(error = %e, "remote pull failed; trying local cache"),
            }
        }

        match self.load_local()? {
            Some(loaded) => Ok((loaded, false)),
            None => Err(CofferError::VaultNotFound),
        }
    }

    /// Persist the sealed record to local storage
    ///
    /// This is the enforcement point of the never-plaintext-on-disk
    /// invariant: only the sealed [`VaultRecord`] shape can be written.
    pub fn persist_local(&self, vault: &UnlockedVault, key: &DataKey) -> CofferResult<()> {
        let record = vault.seal(key)?;
        write_json_atomic(self.paths.vault_file(), &record)
    }

    /// Load the local record, tolerating the legacy plaintext-metadata shape
    pub fn load_local(&self) -> CofferResult<Option<LoadedVault>> {
        let raw: Option<StoredVaultRecord> = read_json_opt(self.paths.vault_file())?;
        Ok(raw.map(LoadedVault::from))
    }

    /// Push the sealed record to the remote backup (no-op without a remote)
    pub async fn push(&self, vault: &UnlockedVault, key: &DataKey) -> CofferResult<()> {
        let Some(remote) = &self.remote else {
            return Ok(());
        };
        let record = RemoteVaultRecord::new(vault.seal(key)?);
        remote.push(&vault.envelope.owner_id, &record).await
    }

    /// Cache the user profile (identity only; never key material)
    pub fn save_profile(&self, profile: &UserProfile) -> CofferResult<()> {
        write_json_atomic(self.paths.profile_file(), profile)
    }

    /// Load the cached user profile
    pub fn load_profile(&self) -> CofferResult<Option<UserProfile>> {
        read_json_opt(self.paths.profile_file())
    }

    /// Remove all local vault state (sign-out / delete account)
    pub fn clear(&self) -> CofferResult<()> {
        remove_if_exists(self.paths.vault_file())?;
        remove_if_exists(self.paths.profile_file())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AccountId, CategoryId, Money, Transaction, TransactionId, TransactionSource,
    };
    use crate::vault::remote::MemoryRemoteStore;
    use crate::vault::session::AuthMethod;
    use crate::vault::shards::rebuild_shards;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn profile() -> UserProfile {
        UserProfile {
            user_id: "user-1".to_string(),
            email: "u@example.com".to_string(),
            display_name: "U".to_string(),
            auth_method: AuthMethod::Password,
        }
    }

    fn tx(id: &str, date: (i32, u32, u32)) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            account_id: AccountId::new("acct-1"),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            merchant: "Trader Market".to_string(),
            amount: Money::from_cents(1850),
            category_id: CategoryId::uncategorized(),
            source: TransactionSource::Provider,
        }
    }

    fn local_store(dir: &TempDir) -> VaultStore {
        VaultStore::new(CofferPaths::with_base_dir(dir.path().to_path_buf()))
    }

    #[tokio::test]
    async fn test_create_then_unlock_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = local_store(&dir);
        let secret = SecretString::new("S");

        let session = store.create_vault(profile(), &secret).await.unwrap();
        let categories = session.vault.metadata.categories.clone();
        session.lock();

        let session = store.unlock(profile(), &secret).await.unwrap();
        assert_eq!(session.vault.metadata.categories, categories);
        assert!(session.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_unlock_wrong_secret() {
        let dir = TempDir::new().unwrap();
        let store = local_store(&dir);
        store
            .create_vault(profile(), &SecretString::new("right"))
            .await
            .unwrap();

        let err = store
            .unlock(profile(), &SecretString::new("wrong"))
            .await
            .unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn test_unlock_without_any_vault() {
        let dir = TempDir::new().unwrap();
        let store = local_store(&dir);
        let err = store
            .unlock(profile(), &SecretString::new("S"))
            .await
            .unwrap_err();
        assert!(err.is_vault_not_found());
    }

    #[tokio::test]
    async fn test_transactions_roundtrip_through_persist() {
        let dir = TempDir::new().unwrap();
        let store = local_store(&dir);
        let secret = SecretString::new("S");

        let mut session = store.create_vault(profile(), &secret).await.unwrap();
        session.transactions = vec![tx("a", (2026, 1, 10)), tx("b", (2026, 2, 3))];
        session.vault.shards = rebuild_shards(session.key(), &session.transactions).unwrap();
        store.persist_local(&session.vault, session.key()).unwrap();
        session.lock();

        let session = store.unlock(profile(), &secret).await.unwrap();
        assert_eq!(session.transactions.len(), 2);
        // Newest first.
        assert_eq!(session.transactions[0].id, TransactionId::new("b"));
    }

    #[tokio::test]
    async fn test_persisted_record_has_no_plaintext_metadata() {
        let dir = TempDir::new().unwrap();
        let store = local_store(&dir);
        store
            .create_vault(profile(), &SecretString::new("S"))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.paths().vault_file()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let obj = json.as_object().unwrap();
        for field in [
            "categories",
            "budgets",
            "rules",
            "linkedAccounts",
            "familyMembers",
        ] {
            assert!(!obj.contains_key(field), "{} leaked to disk", field);
        }
        assert!(obj.contains_key("encryptedMetadata"));
        // The merchant text must not appear anywhere in the raw record.
        assert!(!raw.contains("Groceries"));
    }

    /// Shared remote so two stores can simulate two devices.
    struct SharedRemote(Arc<MemoryRemoteStore>);

    #[async_trait::async_trait]
    impl RemoteStore for SharedRemote {
        async fn push(&self, owner_id: &str, record: &RemoteVaultRecord) -> CofferResult<()> {
            self.0.push(owner_id, record).await
        }
        async fn pull(&self, owner_id: &str) -> CofferResult<Option<RemoteVaultRecord>> {
            self.0.pull(owner_id).await
        }
    }

    #[tokio::test]
    async fn test_remote_takes_precedence_over_local() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let secret = SecretString::new("S");

        // Device A creates the vault and pushes a transaction.
        let dir_a = TempDir::new().unwrap();
        let store_a = VaultStore::with_remote(
            CofferPaths::with_base_dir(dir_a.path().to_path_buf()),
            Box::new(SharedRemote(remote.clone())),
        );
        let mut session = store_a.create_vault(profile(), &secret).await.unwrap();
        session.transactions = vec![tx("a", (2026, 1, 10))];
        session.vault.shards = rebuild_shards(session.key(), &session.transactions).unwrap();
        store_a
            .push(&session.vault, session.key())
            .await
            .unwrap();
        session.lock();

        // Device B has no local copy but unlocks from the remote.
        let dir_b = TempDir::new().unwrap();
        let store_b = VaultStore::with_remote(
            CofferPaths::with_base_dir(dir_b.path().to_path_buf()),
            Box::new(SharedRemote(remote.clone())),
        );
        let session = store_b.unlock(profile(), &secret).await.unwrap();
        assert_eq!(session.transactions.len(), 1);

        // And the record is now cached locally for offline use.
        assert!(store_b.paths().is_initialized());
    }

    #[tokio::test]
    async fn test_legacy_record_migrates_on_unlock() {
        let dir = TempDir::new().unwrap();
        let store = local_store(&dir);
        let secret = SecretString::new("S");

        let (envelope, _key) = KeyEnvelope::create("user-1", &secret).unwrap();
        let legacy = serde_json::json!({
            "envelope": envelope,
            "shards": [],
            "categories": crate::models::default_categories(),
        });
        store.paths().ensure_directories().unwrap();
        std::fs::write(
            store.paths().vault_file(),
            serde_json::to_string(&legacy).unwrap(),
        )
        .unwrap();

        let session = store.unlock(profile(), &secret).await.unwrap();
        assert!(!session.vault.metadata.categories.is_empty());

        // Unlock rewrote the record sealed.
        let raw = std::fs::read_to_string(store.paths().vault_file()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json.get("categories").is_none());
        assert!(json.get("encryptedMetadata").is_some());
    }

    #[tokio::test]
    async fn test_clear_removes_local_state() {
        let dir = TempDir::new().unwrap();
        let store = local_store(&dir);
        store
            .create_vault(profile(), &SecretString::new("S"))
            .await
            .unwrap();
        assert!(store.paths().is_initialized());

        store.clear().unwrap();
        assert!(!store.paths().is_initialized());
        assert!(store.load_profile().unwrap().is_none());
    }
}

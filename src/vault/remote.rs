//! Remote backup store
//!
//! The remote store holds one opaque encrypted record per owner. It never
//! receives a data key or plaintext; conflict policy is last writer wins,
//! and the remote copy is the source of truth on multi-device unlock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{CofferError, CofferResult};

use super::record::VaultRecord;

/// Default timeout applied to remote calls; the engine itself never retries
const REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// A sealed vault record plus sync bookkeeping, as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteVaultRecord {
    #[serde(flatten)]
    pub record: VaultRecord,
    pub shard_count: usize,
    pub last_sync_at: DateTime<Utc>,
}

impl RemoteVaultRecord {
    /// Wrap a sealed record with fresh bookkeeping
    pub fn new(record: VaultRecord) -> Self {
        let shard_count = record.shards.len();
        Self {
            record,
            shard_count,
            last_sync_at: Utc::now(),
        }
    }
}

/// A backup store holding one opaque encrypted record per owner
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Replace the owner's record (last writer wins)
    async fn push(&self, owner_id: &str, record: &RemoteVaultRecord) -> CofferResult<()>;

    /// Fetch the owner's record, `None` if the owner has never pushed
    async fn pull(&self, owner_id: &str) -> CofferResult<Option<RemoteVaultRecord>>;
}

/// HTTP-backed remote store (`PUT`/`GET {base}/vaults/{owner}`)
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    /// Create a store against the given base URL
    pub fn new(base_url: impl Into<String>) -> CofferResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .map_err(|e| CofferError::Remote(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn vault_url(&self, owner_id: &str) -> String {
        format!("{}/vaults/{}", self.base_url, owner_id)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn push(&self, owner_id: &str, record: &RemoteVaultRecord) -> CofferResult<()> {
        debug!(owner = owner_id, shards = record.shard_count, "pushing vault record");
        let response = self
            .client
            .put(self.vault_url(owner_id))
            .json(record)
            .send()
            .await
            .map_err(|e| CofferError::Remote(format!("push failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CofferError::Remote(format!(
                "push rejected with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn pull(&self, owner_id: &str) -> CofferResult<Option<RemoteVaultRecord>> {
        let response = self
            .client
            .get(self.vault_url(owner_id))
            .send()
            .await
            .map_err(|e| CofferError::Remote(format!("pull failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CofferError::Remote(format!(
                "pull rejected with status {}",
                response.status()
            )));
        }

        let record = response
            .json::<RemoteVaultRecord>()
            .await
            .map_err(|e| CofferError::Remote(format!("invalid remote record: {}", e)))?;
        Ok(Some(record))
    }
}

/// In-memory remote store: offline development and test double
#[derive(Default)]
pub struct MemoryRemoteStore {
    records: Mutex<HashMap<String, RemoteVaultRecord>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn push(&self, owner_id: &str, record: &RemoteVaultRecord) -> CofferResult<()> {
        self.records
            .lock()
            .await
            .insert(owner_id.to_string(), record.clone());
        Ok(())
    }

    async fn pull(&self, owner_id: &str) -> CofferResult<Option<RemoteVaultRecord>> {
        Ok(self.records.lock().await.get(owner_id).cloned())
    }
}

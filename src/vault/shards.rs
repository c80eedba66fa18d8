//! Monthly transaction shards
//!
//! Transactions are encrypted in batches of one calendar month each. Shards
//! are always rebuilt wholesale from the complete transaction set: a month
//! that loses its last transaction simply stops producing a shard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crypto::{decrypt_payload, encrypt_payload, DataKey, EncryptedBlob};
use crate::error::{CofferError, CofferResult};
use crate::models::{ShardId, Transaction};

/// One encrypted batch of transactions scoped to a calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultShard {
    pub id: ShardId,
    /// `YYYY-MM`
    pub month_key: String,
    /// Encrypted transaction list (base64)
    pub ciphertext: String,
    /// IV for this shard (base64)
    pub iv: String,
    pub updated_at: DateTime<Utc>,
}

impl VaultShard {
    fn blob(&self) -> EncryptedBlob {
        EncryptedBlob {
            ciphertext: self.ciphertext.clone(),
            iv: self.iv.clone(),
        }
    }
}

/// Encrypt one month's transactions into a fresh shard
fn encrypt_shard(
    key: &DataKey,
    month_key: String,
    transactions: &[Transaction],
) -> CofferResult<VaultShard> {
    let blob = encrypt_payload(key, &transactions)?;
    Ok(VaultShard {
        id: ShardId::new(),
        month_key,
        ciphertext: blob.ciphertext,
        iv: blob.iv,
        updated_at: Utc::now(),
    })
}

/// Rebuild the full shard set from the complete transaction list
///
/// Callers must pass *all* transactions: this is a replacement, not a merge.
pub fn rebuild_shards(key: &DataKey, transactions: &[Transaction]) -> CofferResult<Vec<VaultShard>> {
    let mut groups: Vec<(String, Vec<Transaction>)> = Vec::new();
    for tx in transactions {
        let month_key = tx.month_key();
        match groups.iter_mut().find(|(mk, _)| *mk == month_key) {
            Some((_, list)) => list.push(tx.clone()),
            None => groups.push((month_key, vec![tx.clone()])),
        }
    }

    let mut shards = Vec::with_capacity(groups.len());
    for (month_key, group) in groups {
        shards.push(encrypt_shard(key, month_key, &group)?);
    }
    debug!(shards = shards.len(), "rebuilt shard set");
    Ok(shards)
}

/// Decrypt every shard and return all transactions, newest first
///
/// A single shard failing to decrypt fails the whole operation; partial
/// recovery would hide vault corruption from the caller.
pub fn decrypt_all_transactions(
    shards: &[VaultShard],
    key: &DataKey,
) -> CofferResult<Vec<Transaction>> {
    let mut all = Vec::new();
    for shard in shards {
        let txs: Vec<Transaction> = decrypt_payload(key, &shard.blob()).map_err(|e| match e {
            CofferError::Corruption(msg) => {
                CofferError::Corruption(format!("shard {}: {}", shard.month_key, msg))
            }
            other => other,
        })?;
        all.extend(txs);
    }
    // Stable sort keeps encounter order for same-day transactions.
    all.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(all)
}

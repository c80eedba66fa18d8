//! Transaction model
//!
//! A transaction as it lives inside the vault: always plaintext in memory,
//! always encrypted (inside a monthly shard) on disk or remote. The `id` is
//! stable across re-sync and is the sole de-duplication key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CategoryId, TransactionId};
use super::money::Money;

/// Where a transaction originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    /// Pulled from a linked bank account
    #[default]
    Provider,
    /// Entered or edited by the user
    Manual,
}

impl fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider => write!(f, "provider"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Stable identifier (provider-assigned or minted at manual entry)
    pub id: TransactionId,

    /// The linked bank account this transaction belongs to
    pub account_id: AccountId,

    /// Transaction date
    pub date: NaiveDate,

    /// Merchant or description text as reported by the provider
    pub merchant: String,

    /// Amount spent (positive for outflow)
    pub amount: Money,

    /// Assigned category; `uncategorized` until some tier classifies it
    pub category_id: CategoryId,

    /// Where this transaction came from
    #[serde(default)]
    pub source: TransactionSource,
}

impl Transaction {
    /// The `YYYY-MM` key of the shard this transaction belongs to
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    /// Check whether no tier has classified this transaction yet
    pub fn is_uncategorized(&self) -> bool {
        self.category_id.is_uncategorized()
    }
}

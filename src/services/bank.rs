//! Bank-link providers
//!
//! The real deployment would sit behind an aggregator; the demo link
//! generates a deterministic transaction history so the rest of the engine
//! can be exercised offline.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};

use crate::error::CofferResult;
use crate::models::{
    BankAccount, CategoryId, Money, Transaction, TransactionId, TransactionSource,
};

/// Source of new transactions for a linked account
#[async_trait]
pub trait BankLink: Send + Sync {
    /// Fetch transactions for one account, excluding any whose id is
    /// already known to the vault
    async fn fetch_new(
        &self,
        account: &BankAccount,
        known: &HashSet<TransactionId>,
    ) -> CofferResult<Vec<Transaction>>;
}

const DEMO_MERCHANTS: [(&str, i64); 8] = [
    ("Trader Market", 6240),
    ("Cloud Coffee", 575),
    ("Rent Payment", 185000),
    ("City Electric", 9410),
    ("Family Pharmacy", 2380),
    ("Movie Cinema", 3200),
    ("Ride Uber", 1845),
    ("Corner Store", 1530),
];

/// Deterministic offline provider: the same account and anchor date always
/// yield the same transaction history
pub struct DemoBankLink {
    anchor: NaiveDate,
}

impl DemoBankLink {
    pub fn new() -> Self {
        Self {
            anchor: Utc::now().date_naive(),
        }
    }

    /// Fix the anchor date, so tests get stable ids
    pub fn anchored(anchor: NaiveDate) -> Self {
        Self { anchor }
    }

    fn generate(&self, account: &BankAccount) -> Vec<Transaction> {
        (0..24)
            .filter_map(|i: u32| {
                let months_back = i / 3;
                let month0 = self.anchor.month0() as i64 - months_back as i64;
                let year = self.anchor.year() + month0.div_euclid(12) as i32;
                let month = month0.rem_euclid(12) as u32 + 1;
                // Days 5..=24 exist in every month.
                let day = 5 + i % 20;
                let date = NaiveDate::from_ymd_opt(year, month, day)?;

                let (merchant, cents) = DEMO_MERCHANTS[i as usize % DEMO_MERCHANTS.len()];
                Some(Transaction {
                    id: TransactionId::new(format!("{}-{}-{}", account.id.as_str(), date, i)),
                    account_id: account.id.clone(),
                    date,
                    merchant: merchant.to_string(),
                    amount: Money::from_cents(cents),
                    category_id: CategoryId::uncategorized(),
                    source: TransactionSource::Provider,
                })
            })
            .collect()
    }
}

impl Default for DemoBankLink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BankLink for DemoBankLink {
    async fn fetch_new(
        &self,
        account: &BankAccount,
        known: &HashSet<TransactionId>,
    ) -> CofferResult<Vec<Transaction>> {
        Ok(self
            .generate(account)
            .into_iter()
            .filter(|tx| !known.contains(&tx.id))
            .collect())
    }
}

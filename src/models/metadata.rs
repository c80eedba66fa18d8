//! Vault metadata: everything in the vault except raw transactions
//!
//! The whole aggregate is encrypted as a single blob on persist, so a change
//! to any one field never needs per-field re-encryption.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::{default_categories, Category};
use super::ids::{AccountId, CategoryId, MemberId};
use super::money::Money;
use super::rule::CategorizationRule;

/// A linked bank account (the account itself, not its transactions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    /// Stable identifier from the bank-link provider
    pub id: AccountId,
    /// Provider-side account id, when linked through a real provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_account_id: Option<String>,
    pub institution_name: String,
    pub account_name: String,
    /// Last digits of the account number, for display
    pub mask: String,
    pub added_at: DateTime<Utc>,
}

/// Role of a family member within a shared vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    #[default]
    Member,
}

/// A family member with visibility into the vault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: MemberId,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub role: MemberRole,
}

/// A budget target for one category in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetTarget {
    pub category_id: CategoryId,
    /// `YYYY-MM`
    pub month_key: String,
    pub amount: Money,
}

/// Supported AI classification providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAi,
    Anthropic,
    Google,
}

impl AiProvider {
    /// The default model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::Google => "gemini-2.0-flash",
        }
    }
}

/// User-configured AI provider settings, stored encrypted with the metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: AiProvider,
    pub api_key: String,
    pub model: String,
    pub enabled: bool,
}

impl AiSettings {
    /// Check whether tier-2 classification can run at all
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }
}

/// The non-transaction vault state, encrypted wholesale as one blob
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMetadata {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub budgets: Vec<BudgetTarget>,
    #[serde(default)]
    pub rules: Vec<CategorizationRule>,
    #[serde(default)]
    pub linked_accounts: Vec<BankAccount>,
    #[serde(default)]
    pub family_members: Vec<FamilyMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_settings: Option<AiSettings>,
}

impl VaultMetadata {
    /// Metadata seeded into a fresh vault: default categories plus a starter
    /// budget for the current month in every real category.
    pub fn bootstrap(now: DateTime<Utc>) -> Self {
        let categories = default_categories();
        let month_key = now.format("%Y-%m").to_string();
        let budgets = categories
            .iter()
            .filter(|c| !c.id.is_uncategorized())
            .map(|c| BudgetTarget {
                category_id: c.id.clone(),
                month_key: month_key.clone(),
                amount: Money::from_dollars(400),
            })
            .collect();
        Self {
            categories,
            budgets,
            ..Default::default()
        }
    }

    /// Look up a category's display name
    pub fn category_name(&self, id: &CategoryId) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.as_str())
    }
}

//! Core data models for the coffer vault
//!
//! Everything here is the plaintext, in-memory shape of vault data. The
//! encrypted at-rest shapes live in [`crate::vault`].

pub mod category;
pub mod ids;
pub mod metadata;
pub mod money;
pub mod rule;
pub mod transaction;

pub use category::{default_categories, Category, CATEGORY_PALETTE};
pub use ids::{AccountId, CategoryId, MemberId, RuleId, ShardId, TransactionId};
pub use metadata::{
    AiProvider, AiSettings, BankAccount, BudgetTarget, FamilyMember, MemberRole, VaultMetadata,
};
pub use money::Money;
pub use rule::CategorizationRule;
pub use transaction::{Transaction, TransactionSource};

//! Manual vault edits: recategorization, budgets, categories, family,
//! and AI settings
//!
//! Every edit mutates the session in memory, then persists the sealed
//! vault before returning. The remote copy catches up on the next sync.

use tracing::debug;

use crate::categorize::{add_or_boost_rule, merchant_prefix};
use crate::error::{CofferError, CofferResult};
use crate::models::{
    AiSettings, BudgetTarget, Category, CategoryId, FamilyMember, MemberId, MemberRole, Money,
    TransactionId, CATEGORY_PALETTE,
};
use crate::vault::{rebuild_shards, Session, VaultStore};

fn persist(session: &Session, store: &VaultStore) -> CofferResult<()> {
    store.persist_local(&session.vault, session.key())
}

/// Manually assign a category to one transaction and learn a rule from it
///
/// The learned pattern is the first two words of the merchant, so future
/// transactions from the same merchant are categorized by tier 1.
pub fn recategorize_transaction(
    session: &mut Session,
    store: &VaultStore,
    transaction_id: &TransactionId,
    category_id: &CategoryId,
) -> CofferResult<()> {
    if !session
        .vault
        .metadata
        .categories
        .iter()
        .any(|c| &c.id == category_id)
    {
        return Err(CofferError::Validation(format!(
            "unknown category: {}",
            category_id.as_str()
        )));
    }
    let tx = session
        .transactions
        .iter_mut()
        .find(|t| &t.id == transaction_id)
        .ok_or_else(|| {
            CofferError::Validation(format!("unknown transaction: {}", transaction_id))
        })?;

    tx.category_id = category_id.clone();
    let pattern = merchant_prefix(&tx.merchant, 2);
    if !pattern.is_empty() {
        add_or_boost_rule(&mut session.vault.metadata.rules, &pattern, category_id);
        debug!(pattern = %pattern, category = %category_id.as_str(), "learned rule from manual edit");
    }

    session.vault.shards = rebuild_shards(session.key(), &session.transactions)?;
    persist(session, store)
}

/// Set or replace the budget for one category in one month
pub fn set_budget(
    session: &mut Session,
    store: &VaultStore,
    category_id: &CategoryId,
    month_key: &str,
    amount: Money,
) -> CofferResult<()> {
    let budgets = &mut session.vault.metadata.budgets;
    budgets.retain(|b| !(&b.category_id == category_id && b.month_key == month_key));
    budgets.push(BudgetTarget {
        category_id: category_id.clone(),
        month_key: month_key.to_string(),
        amount,
    });
    persist(session, store)
}

/// Add a user-defined category, cycling through the shared palette
pub fn add_category(
    session: &mut Session,
    store: &VaultStore,
    name: &str,
) -> CofferResult<Category> {
    let id = CategoryId::from_name(name);
    if id.as_str().is_empty() {
        return Err(CofferError::Validation("category name is empty".to_string()));
    }
    let categories = &mut session.vault.metadata.categories;
    if categories.iter().any(|c| c.id == id) {
        return Err(CofferError::Validation(format!(
            "category already exists: {}",
            id.as_str()
        )));
    }

    let custom_count = categories.iter().filter(|c| !c.is_default).count();
    let color = CATEGORY_PALETTE[custom_count % CATEGORY_PALETTE.len()];
    let category = Category::custom(id, name, color);
    categories.push(category.clone());
    persist(session, store)?;
    Ok(category)
}

/// Add a family member with vault visibility
pub fn add_family_member(
    session: &mut Session,
    store: &VaultStore,
    email: &str,
    display_name: &str,
) -> CofferResult<FamilyMember> {
    let members = &mut session.vault.metadata.family_members;
    if members.iter().any(|m| m.email == email) {
        return Err(CofferError::Validation(format!(
            "member already exists: {}",
            email
        )));
    }
    let member = FamilyMember {
        id: MemberId::new(),
        email: email.to_string(),
        display_name: display_name.to_string(),
        role: MemberRole::Member,
    };
    members.push(member.clone());
    persist(session, store)?;
    Ok(member)
}

/// Remove a family member by email; owners cannot be removed
pub fn remove_family_member(
    session: &mut Session,
    store: &VaultStore,
    email: &str,
) -> CofferResult<()> {
    let members = &mut session.vault.metadata.family_members;
    let member = members
        .iter()
        .find(|m| m.email == email)
        .ok_or_else(|| CofferError::Validation(format!("no such member: {}", email)))?;
    if member.role == MemberRole::Owner {
        return Err(CofferError::Validation(
            "cannot remove the vault owner".to_string(),
        ));
    }
    members.retain(|m| m.email != email);
    persist(session, store)
}

/// Replace the AI provider settings (the key lives inside the encrypted
/// metadata, never in device-local config)
pub fn update_ai_settings(
    session: &mut Session,
    store: &VaultStore,
    settings: Option<AiSettings>,
) -> CofferResult<()> {
    session.vault.metadata.ai_settings = settings;
    persist(session, store)
}

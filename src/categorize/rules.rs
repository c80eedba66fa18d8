//! Tier-1 categorization: learned rules and the heuristic dictionary
//!
//! Rule matching is case-insensitive substring containment against the
//! normalized merchant text; first match wins, and rule order is insertion
//! order. The heuristic dictionary is a fixed, ordered keyword table used
//! only when no rule matches.

use crate::models::{CategorizationRule, Category, CategoryId, Transaction};

/// Fixed keyword -> category fallback, checked in order after rules
const HEURISTIC_DICTIONARY: [(&str, &str); 14] = [
    ("trader", "groceries"),
    ("market", "groceries"),
    ("uber", "transport"),
    ("lyft", "transport"),
    ("shell", "transport"),
    ("rent", "housing"),
    ("electric", "utilities"),
    ("water", "utilities"),
    ("coffee", "dining"),
    ("restaurant", "dining"),
    ("pharmacy", "health"),
    ("doctor", "health"),
    ("cinema", "entertainment"),
    ("store", "shopping"),
];

/// Lowercase, collapse whitespace, trim
pub fn normalize_merchant(merchant: &str) -> String {
    merchant
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `words` words of the normalized merchant, the rule-learning pattern
/// for manual recategorization
pub fn merchant_prefix(merchant: &str, words: usize) -> String {
    normalize_merchant(merchant)
        .split(' ')
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pattern learned from a high-confidence AI hit: the first three words of
/// length > 2 in the normalized merchant (may be empty for terse merchants)
pub fn auto_rule_pattern(merchant: &str) -> String {
    normalize_merchant(merchant)
        .split(' ')
        .filter(|w| w.len() > 2)
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First rule whose pattern is contained in the normalized merchant
pub fn apply_rules(tx: &Transaction, rules: &[CategorizationRule]) -> Option<CategoryId> {
    let merchant = normalize_merchant(&tx.merchant);
    rules
        .iter()
        .find(|rule| merchant.contains(&rule.pattern))
        .map(|rule| rule.category_id.clone())
}

/// Classify one transaction: rules first, heuristics second, else unchanged
pub fn categorize_transaction(tx: &Transaction, rules: &[CategorizationRule]) -> CategoryId {
    if let Some(by_rule) = apply_rules(tx, rules) {
        return by_rule;
    }
    let merchant = normalize_merchant(&tx.merchant);
    HEURISTIC_DICTIONARY
        .iter()
        .find(|(word, _)| merchant.contains(word))
        .map(|(_, category)| CategoryId::new(*category))
        .unwrap_or_else(CategoryId::uncategorized)
}

/// Tier 1 over a batch: only uncategorized transactions are touched
pub fn auto_categorize(transactions: &mut [Transaction], rules: &[CategorizationRule]) {
    for tx in transactions.iter_mut() {
        if tx.is_uncategorized() {
            tx.category_id = categorize_transaction(tx, rules);
        }
    }
}

/// Boost an existing (pattern, category) rule or append a fresh one
pub fn add_or_boost_rule(
    rules: &mut Vec<CategorizationRule>,
    pattern: &str,
    category_id: &CategoryId,
) {
    let normalized = normalize_merchant(pattern);
    if let Some(existing) = rules
        .iter_mut()
        .find(|r| r.pattern == normalized && &r.category_id == category_id)
    {
        existing.hit_count += 1;
        return;
    }
    rules.push(CategorizationRule::new(normalized, category_id.clone()));
}

/// A candidate rule surfaced from recurring categorized merchants
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSuggestion {
    pub pattern: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub count: usize,
}

/// Surface up to three rule candidates from already-categorized transactions
///
/// Groups by 2-word normalized merchant prefix; the category of a group is
/// whichever was seen first for that prefix. Output keeps discovery order;
/// no frequency sort is applied.
pub fn suggest_rules(
    transactions: &[Transaction],
    rules: &[CategorizationRule],
    categories: &[Category],
) -> Vec<RuleSuggestion> {
    let mut counts: Vec<(String, CategoryId, usize)> = Vec::new();
    for tx in transactions {
        if tx.is_uncategorized() {
            continue;
        }
        let key = merchant_prefix(&tx.merchant, 2);
        match counts.iter_mut().find(|(pattern, _, _)| *pattern == key) {
            Some((_, _, count)) => *count += 1,
            None => counts.push((key, tx.category_id.clone(), 1)),
        }
    }

    counts
        .into_iter()
        .filter(|(pattern, category_id, count)| {
            *count >= 3
                && !rules
                    .iter()
                    .any(|r| &r.pattern == pattern && &r.category_id == category_id)
        })
        .take(3)
        .map(|(pattern, category_id, count)| {
            let category_name = categories
                .iter()
                .find(|c| c.id == category_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            RuleSuggestion {
                pattern,
                category_id,
                category_name,
                count,
            }
        })
        .collect()
}

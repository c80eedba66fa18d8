//! Two-tier categorization over a sync batch
//!
//! Tier 1 (rules + heuristics) always runs and is purely local. Tier 2 asks
//! the configured AI provider about whatever tier 1 left uncategorized; a
//! provider failure degrades to tier-1-only output and is reported as a
//! message, never an error.

use crate::ai::{self, TextCompletion, ACCEPT_THRESHOLD, AUTO_RULE_THRESHOLD};
use crate::models::{AiSettings, CategorizationRule, Category, Transaction};

use super::rules::{add_or_boost_rule, auto_categorize, auto_rule_pattern};

/// Result of running the pipeline over one batch
#[derive(Debug)]
pub struct CategorizeOutcome {
    pub transactions: Vec<Transaction>,
    pub rules: Vec<CategorizationRule>,
    /// Transactions the AI tier categorized (tier-1 hits excluded)
    pub categorized_count: usize,
    /// Provider failure message, if tier 2 was attempted and failed
    pub error: Option<String>,
}

pub async fn categorize_with_ai(
    mut transactions: Vec<Transaction>,
    mut rules: Vec<CategorizationRule>,
    categories: &[Category],
    ai_settings: Option<&AiSettings>,
    client: &dyn TextCompletion,
) -> CategorizeOutcome {
    auto_categorize(&mut transactions, &rules);

    let settings = match ai_settings {
        Some(s) if s.is_usable() => s,
        _ => {
            return CategorizeOutcome {
                transactions,
                rules,
                categorized_count: 0,
                error: None,
            }
        }
    };

    let pending: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| tx.is_uncategorized())
        .cloned()
        .collect();
    if pending.is_empty() {
        return CategorizeOutcome {
            transactions,
            rules,
            categorized_count: 0,
            error: None,
        };
    }

    let classified =
        match ai::classify_transactions(client, settings, &pending, categories, &rules).await {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(error = %err, "AI categorization failed, keeping rule results");
                return CategorizeOutcome {
                    transactions,
                    rules,
                    categorized_count: 0,
                    error: Some(err.to_string()),
                };
            }
        };

    let mut categorized_count = 0;
    for tx in transactions.iter_mut() {
        if !tx.is_uncategorized() {
            continue;
        }
        let Some(classification) = classified.get(&tx.id) else {
            continue;
        };
        if classification.confidence < ACCEPT_THRESHOLD {
            continue;
        }
        tx.category_id = classification.category_id.clone();
        categorized_count += 1;

        if classification.confidence >= AUTO_RULE_THRESHOLD {
            let pattern = auto_rule_pattern(&tx.merchant);
            if !pattern.is_empty() {
                add_or_boost_rule(&mut rules, &pattern, &classification.category_id);
            }
        }
    }

    CategorizeOutcome {
        transactions,
        rules,
        categorized_count,
        error: None,
    }
}

//! Prompt construction for tier-2 classification
//!
//! One textual prompt per batch: the available categories, a sample of the
//! learned rules as context, and the transactions to classify.

use crate::models::{CategorizationRule, Category, Transaction};

/// Maximum transactions per provider call; excess waits for a future cycle
pub const MAX_BATCH: usize = 50;

/// Maximum learned rules included as context lines
pub const MAX_RULE_CONTEXT: usize = 30;

/// Build the classification prompt for one batch
pub fn build_prompt(
    transactions: &[Transaction],
    categories: &[Category],
    rules: &[CategorizationRule],
) -> String {
    let category_list = categories
        .iter()
        .filter(|c| !c.id.is_uncategorized())
        .map(|c| format!("- {}: {}", c.id, c.name))
        .collect::<Vec<_>>()
        .join("\n");

    let rule_list = if rules.is_empty() {
        "(none yet)".to_string()
    } else {
        rules
            .iter()
            .take(MAX_RULE_CONTEXT)
            .map(|r| format!("- \"{}\" -> {}", r.pattern, r.category_id))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let tx_list = transactions
        .iter()
        .take(MAX_BATCH)
        .enumerate()
        .map(|(i, tx)| {
            format!(
                "{}. id:\"{}\" description:\"{}\" amount:{}",
                i + 1,
                tx.id,
                tx.merchant,
                tx.amount
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a financial transaction categorizer. Classify each transaction into exactly one of the available categories. Consider the merchant/description text, amount, and any known patterns.\n\
         \n\
         Available categories:\n\
         {category_list}\n\
         \n\
         Known patterns from user rules:\n\
         {rule_list}\n\
         \n\
         Transactions to classify:\n\
         {tx_list}\n\
         \n\
         Respond with ONLY a JSON array, no other text. Each element must have exactly these fields:\n\
         [{{\"id\":\"<transaction id>\",\"categoryId\":\"<category id>\",\"confidence\":<0.0-1.0>}}]\n\
         \n\
         Rules:\n\
         - categoryId MUST be one of the available category ids listed above.\n\
         - confidence should reflect how certain you are (1.0 = certain, 0.5 = guessing).\n\
         - For e-transfers to individuals, use the most likely category based on context, or assign low confidence if unclear.\n\
         - For payroll/salary deposits, use \"uncategorized\" with low confidence (the user may want a custom category).\n\
         - Return one entry per transaction, in the same order."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        default_categories, AccountId, CategoryId, Money, TransactionId, TransactionSource,
    };
    use chrono::NaiveDate;

    fn tx(id: &str, merchant: &str) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            account_id: AccountId::new("acct-1"),
            date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            merchant: merchant.to_string(),
            amount: Money::from_cents(1234),
            category_id: CategoryId::uncategorized(),
            source: TransactionSource::Provider,
        }
    }

    #[test]
    fn test_prompt_excludes_uncategorized_from_category_list() {
        let prompt = build_prompt(&[tx("a", "Cloud Coffee")], &default_categories(), &[]);
        assert!(prompt.contains("- dining: Dining"));
        assert!(!prompt.contains("- uncategorized:"));
        assert!(prompt.contains("(none yet)"));
        assert!(prompt.contains("id:\"a\" description:\"Cloud Coffee\" amount:12.34"));
    }

    #[test]
    fn test_prompt_caps_batch_and_rules() {
        let txs: Vec<Transaction> = (0..60).map(|i| tx(&format!("t{}", i), "Shop")).collect();
        let rules: Vec<_> = (0..40)
            .map(|i| {
                crate::models::CategorizationRule::new(
                    format!("pattern {}", i),
                    CategoryId::new("dining"),
                )
            })
            .collect();

        let prompt = build_prompt(&txs, &default_categories(), &rules);
        assert!(prompt.contains("id:\"t49\""));
        assert!(!prompt.contains("id:\"t50\""));
        assert!(prompt.contains("\"pattern 29\""));
        assert!(!prompt.contains("\"pattern 30\""));
    }
}

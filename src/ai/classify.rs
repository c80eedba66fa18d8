//! Tier-2 batch classification entry point

use std::collections::{HashMap, HashSet};

use crate::error::CofferResult;
use crate::models::{AiSettings, CategorizationRule, Category, Transaction, TransactionId};

use super::client::TextCompletion;
use super::parse::{parse_classifications, Classification};
use super::prompt::{build_prompt, MAX_BATCH};

/// Classify one batch of transactions with the configured provider
///
/// Returns an empty map when the provider is disabled, missing a key, or
/// there is nothing to classify. Exactly one provider call is made per
/// non-empty batch; any excess over the batch cap is left for a future
/// sync cycle.
pub async fn classify_transactions(
    client: &dyn TextCompletion,
    settings: &AiSettings,
    transactions: &[Transaction],
    categories: &[Category],
    rules: &[CategorizationRule],
) -> CofferResult<HashMap<TransactionId, Classification>> {
    if !settings.is_usable() || transactions.is_empty() {
        return Ok(HashMap::new());
    }

    let batch = &transactions[..transactions.len().min(MAX_BATCH)];
    let prompt = build_prompt(batch, categories, rules);

    let model = if settings.model.is_empty() {
        settings.provider.default_model()
    } else {
        settings.model.as_str()
    };

    let raw = client
        .complete(settings.provider, &prompt, &settings.api_key, model)
        .await?;

    // The valid-id set includes `uncategorized`: the prompt tells the model
    // to use it for payroll-style deposits, and those entries must survive
    // validation rather than be silently dropped.
    let valid_ids: HashSet<_> = categories.iter().map(|c| c.id.clone()).collect();
    Ok(parse_classifications(&raw, &valid_ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::ScriptedCompletion;
    use crate::models::{
        default_categories, AccountId, AiProvider, CategoryId, Money, TransactionSource,
    };
    use chrono::NaiveDate;

    fn tx(id: &str) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            account_id: AccountId::new("acct-1"),
            date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            merchant: "Mystery Shop".to_string(),
            amount: Money::from_cents(900),
            category_id: CategoryId::uncategorized(),
            source: TransactionSource::Provider,
        }
    }

    fn settings(enabled: bool, key: &str) -> AiSettings {
        AiSettings {
            provider: AiProvider::OpenAi,
            api_key: key.to_string(),
            model: String::new(),
            enabled,
        }
    }

    #[tokio::test]
    async fn test_disabled_settings_make_no_call() {
        let mock = ScriptedCompletion::replying("[]");
        let out = classify_transactions(
            &mock,
            &settings(false, "sk"),
            &[tx("a")],
            &default_categories(),
            &[],
        )
        .await
        .unwrap();
        assert!(out.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_call() {
        let mock = ScriptedCompletion::replying("[]");
        let out = classify_transactions(
            &mock,
            &settings(true, ""),
            &[tx("a")],
            &default_categories(),
            &[],
        )
        .await
        .unwrap();
        assert!(out.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_single_call_and_parse() {
        let mock = ScriptedCompletion::replying(
            r#"[{"id":"a","categoryId":"dining","confidence":0.92}]"#,
        );
        let out = classify_transactions(
            &mock,
            &settings(true, "sk"),
            &[tx("a"), tx("b")],
            &default_categories(),
            &[],
        )
        .await
        .unwrap();

        assert_eq!(mock.call_count(), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[&TransactionId::new("a")].category_id,
            CategoryId::new("dining")
        );
    }

    #[tokio::test]
    async fn test_batch_capped_at_fifty() {
        let mock = ScriptedCompletion::replying("[]");
        let txs: Vec<Transaction> = (0..75).map(|i| tx(&format!("t{}", i))).collect();
        classify_transactions(&mock, &settings(true, "sk"), &txs, &default_categories(), &[])
            .await
            .unwrap();

        let prompt = mock.last_prompt().unwrap();
        assert!(prompt.contains("id:\"t49\""));
        assert!(!prompt.contains("id:\"t50\""));
    }

    #[tokio::test]
    async fn test_uncategorized_survives_domain_validation() {
        let mock = ScriptedCompletion::replying(
            r#"[{"id":"a","categoryId":"uncategorized","confidence":0.3}]"#,
        );
        let out = classify_transactions(
            &mock,
            &settings(true, "sk"),
            &[tx("a")],
            &default_categories(),
            &[],
        )
        .await
        .unwrap();
        assert_eq!(out.len(), 1);
    }
}

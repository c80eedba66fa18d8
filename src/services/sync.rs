//! Account sync: fetch, de-duplicate, categorize, re-shard, persist

use tracing::{debug, info, warn};

use crate::ai::TextCompletion;
use crate::categorize::categorize_with_ai;
use crate::error::CofferResult;
use crate::models::Transaction;
use crate::vault::{rebuild_shards, Session, VaultStore};

use super::bank::BankLink;

/// What one sync cycle did
#[derive(Debug, Default)]
pub struct SyncReport {
    pub new_transactions: usize,
    /// Categorized by the AI tier (rule and heuristic hits excluded)
    pub ai_categorized: usize,
    pub ai_error: Option<String>,
}

/// Pull new transactions for every linked account, categorize them, and
/// persist the updated vault
///
/// The remote push is best effort: local persistence succeeding is what
/// makes the sync durable, and a failed push only logs a warning.
pub async fn sync_accounts(
    session: &mut Session,
    store: &VaultStore,
    bank: &dyn BankLink,
    ai_client: &dyn TextCompletion,
) -> CofferResult<SyncReport> {
    let mut known = session.known_transaction_ids();
    let mut fetched: Vec<Transaction> = Vec::new();
    for account in &session.vault.metadata.linked_accounts {
        let new = bank.fetch_new(account, &known).await?;
        debug!(account = %account.id, count = new.len(), "fetched transactions");
        // Filter again rather than trusting the link: a duplicate id must
        // never reach a shard, even from overlapping account feeds.
        fetched.extend(new.into_iter().filter(|tx| known.insert(tx.id.clone())));
    }

    if fetched.is_empty() {
        info!("sync found no new transactions");
        return Ok(SyncReport::default());
    }
    let new_transactions = fetched.len();

    let outcome = categorize_with_ai(
        fetched,
        session.vault.metadata.rules.clone(),
        &session.vault.metadata.categories,
        session.vault.metadata.ai_settings.as_ref(),
        ai_client,
    )
    .await;

    session.vault.metadata.rules = outcome.rules;
    session.transactions.extend(outcome.transactions);
    session.transactions.sort_by(|a, b| b.date.cmp(&a.date));

    session.vault.shards = rebuild_shards(session.key(), &session.transactions)?;
    store.persist_local(&session.vault, session.key())?;
    if let Err(err) = store.push(&session.vault, session.key()).await {
        warn!(error = %err, "remote push failed, vault saved locally");
    }

    info!(
        new = new_transactions,
        ai = outcome.categorized_count,
        "sync complete"
    );
    Ok(SyncReport {
        new_transactions,
        ai_categorized: outcome.categorized_count,
        ai_error: outcome.error,
    })
}

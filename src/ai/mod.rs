//! Tier-2 AI classification
//!
//! Prompt construction, provider dispatch, and tolerant response parsing.
//! Everything here degrades gracefully: a failed provider call or an
//! unparseable response can never disturb tier-1 results.

pub mod classify;
pub mod client;
pub mod mock;
pub mod parse;
pub mod prompt;

pub use classify::classify_transactions;
pub use client::{HttpCompletionClient, TextCompletion};
pub use mock::ScriptedCompletion;
pub use parse::{Classification, ACCEPT_THRESHOLD, AUTO_RULE_THRESHOLD};
pub use prompt::{build_prompt, MAX_BATCH, MAX_RULE_CONTEXT};

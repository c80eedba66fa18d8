//! Coffer - client-side encrypted personal finance vault
//!
//! Coffer keeps a household's financial data in a vault that only the
//! owner's secret can open. Transactions are encrypted into monthly shards
//! and all settings, rules, accounts, and budgets travel inside a single
//! encrypted metadata blob; servers and backups only ever see ciphertext.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (transactions, categories, rules, metadata)
//! - `crypto`: Key envelope, payload codec, secret handling
//! - `vault`: Shards, sealed records, local and remote persistence
//! - `categorize`: Rule, heuristic, and AI transaction categorization
//! - `ai`: Provider clients for the AI categorization tier
//! - `services`: Bank sync and manual vault edits

pub mod ai;
pub mod categorize;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod services;
pub mod vault;

pub use error::{CofferError, CofferResult};

//! Higher-level operations built on the vault: bank sync and manual edits

pub mod bank;
pub mod edits;
pub mod sync;

pub use bank::{BankLink, DemoBankLink};
pub use edits::{
    add_category, add_family_member, recategorize_transaction, remove_family_member, set_budget,
    update_ai_settings,
};
pub use sync::{sync_accounts, SyncReport};

//! Vault persistence: shards, records, sessions, and stores
//!
//! Everything in this module deals with the encrypted at-rest form of the
//! vault and the lifecycle around unlocking it.

pub mod file_io;
pub mod record;
pub mod remote;
pub mod session;
pub mod shards;
pub mod store;

pub use record::{LoadedVault, StoredVaultRecord, UnlockedVault, VaultRecord};
pub use remote::{HttpRemoteStore, MemoryRemoteStore, RemoteStore, RemoteVaultRecord};
pub use session::{AuthMethod, Session, UserProfile};
pub use shards::{decrypt_all_transactions, rebuild_shards, VaultShard};
pub use store::VaultStore;

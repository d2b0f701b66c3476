//! Abstract storage traits for the Stakeway ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The reward engine and the HTTP layer depend only on the traits.

pub mod error;
pub mod ledger;
pub mod meta;

pub use error::StoreError;
pub use ledger::{check_wallet_key, LedgerStore};
pub use meta::MetaStore;

//! LMDB storage backend for the Stakeway ledger.
//!
//! Implements the traits from `stakeway-store` using the `heed` LMDB bindings.
//! One environment holds two databases: `stakes` (the append-only event log)
//! and `meta` (schema version and the stake id counter).

pub mod environment;
pub mod error;
pub mod integrity;
pub mod ledger;
pub mod meta;
pub mod migration;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::IntegrityReport;
pub use ledger::LmdbLedgerStore;
pub use meta::LmdbMetaStore;

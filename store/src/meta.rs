//! Metadata storage trait.

use crate::StoreError;

/// Schema bookkeeping kept beside the ledger.
///
/// The stake id counter also lives in the meta database but is written inside
/// the ledger's own transaction, so it is not exposed here.
pub trait MetaStore {
    /// Get the current database schema version; 0 for a fresh database.
    fn get_schema_version(&self) -> Result<u32, StoreError>;

    /// Set the database schema version.
    fn set_schema_version(&self, version: u32) -> Result<(), StoreError>;
}

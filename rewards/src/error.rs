//! Reward engine errors.

use stakeway_store::StoreError;
use stakeway_types::ValidationError;
use thiserror::Error;

/// The two failure kinds the engine distinguishes.
#[derive(Debug, Error)]
pub enum RewardError {
    /// Caller input was rejected; storage was not touched.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The ledger store failed; passed through unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl RewardError {
    /// Whether the caller, rather than the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RewardError::Validation(_))
    }
}

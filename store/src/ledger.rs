//! Stake ledger storage trait.

use crate::StoreError;
use stakeway_types::{StakeAmount, StakeEvent};

/// Durable, append-only record of stake events.
///
/// Wallets are keyed by their exact string; the store does no format
/// validation beyond rejecting the empty string. Implementations must be
/// safe to call from many threads at once.
pub trait LedgerStore: Send + Sync {
    /// Append a stake event with a store-assigned id and timestamp.
    ///
    /// The event is durable and visible to [`total_staked`](Self::total_staked)
    /// once this returns `Ok`. Either the whole event is written or nothing is.
    fn record_stake(
        &self,
        wallet_address: &str,
        amount: StakeAmount,
    ) -> Result<StakeEvent, StoreError>;

    /// Sum of all recorded amounts for `wallet_address`, recomputed from the
    /// events on every call. Unknown wallets total zero.
    fn total_staked(&self, wallet_address: &str) -> Result<StakeAmount, StoreError>;

    /// Number of stake events in the ledger across all wallets.
    fn stake_count(&self) -> Result<u64, StoreError>;
}

/// Store-level precondition shared by implementations.
///
/// Non-negativity of the amount is carried by [`StakeAmount`] itself, so only
/// the wallet key needs checking.
pub fn check_wallet_key(wallet_address: &str) -> Result<(), StoreError> {
    if wallet_address.is_empty() {
        return Err(StoreError::InvalidArgument(
            "wallet address must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl<T: LedgerStore + ?Sized> LedgerStore for std::sync::Arc<T> {
    fn record_stake(
        &self,
        wallet_address: &str,
        amount: StakeAmount,
    ) -> Result<StakeEvent, StoreError> {
        (**self).record_stake(wallet_address, amount)
    }

    fn total_staked(&self, wallet_address: &str) -> Result<StakeAmount, StoreError> {
        (**self).total_staked(wallet_address)
    }

    fn stake_count(&self) -> Result<u64, StoreError> {
        (**self).stake_count()
    }
}

//! Core reward engine.

use stakeway_store::LedgerStore;
use stakeway_types::{StakeAmount, StakeEvent, ValidationError, WalletAddress};

use crate::error::RewardError;
use crate::rate::reward_for;

/// The staking operations exposed to the HTTP layer.
///
/// Stateless request/response; every implementation must tolerate
/// concurrent calls from many request handlers.
pub trait StakeService: Send + Sync {
    /// Validate and record a stake of `amount` tokens for `wallet_address`.
    fn stake(&self, wallet_address: &str, amount: f64) -> Result<StakeEvent, RewardError>;

    /// Reward currently owed to `wallet_address`. Never-staked wallets get zero.
    fn get_rewards(&self, wallet_address: &str) -> Result<StakeAmount, RewardError>;

    /// Cumulative stake for `wallet_address`.
    fn total_staked(&self, wallet_address: &str) -> Result<StakeAmount, RewardError>;
}

/// Validates stakes and derives rewards from a ledger.
///
/// Holds no state of its own; the ledger store is the single source of truth
/// and rewards are recomputed from it on every query.
pub struct RewardEngine<S> {
    store: S,
}

impl<S: LedgerStore> RewardEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The ledger this engine reads and writes.
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Lookups accept any non-empty key; only writes enforce the address format.
fn require_wallet(wallet_address: &str) -> Result<(), ValidationError> {
    if wallet_address.is_empty() {
        return Err(ValidationError::EmptyAddress);
    }
    Ok(())
}

impl<S: LedgerStore> StakeService for RewardEngine<S> {
    fn stake(&self, wallet_address: &str, amount: f64) -> Result<StakeEvent, RewardError> {
        let wallet = WalletAddress::parse(wallet_address)?;
        let amount = StakeAmount::from_decimal(amount)?;

        let event = self.store.record_stake(wallet.as_str(), amount)?;
        tracing::debug!(
            id = %event.id,
            wallet = %wallet,
            amount = %amount,
            "stake accepted"
        );
        Ok(event)
    }

    fn get_rewards(&self, wallet_address: &str) -> Result<StakeAmount, RewardError> {
        let total = self.total_staked(wallet_address)?;
        Ok(reward_for(total))
    }

    fn total_staked(&self, wallet_address: &str) -> Result<StakeAmount, RewardError> {
        require_wallet(wallet_address)?;
        Ok(self.store.total_staked(wallet_address)?)
    }
}

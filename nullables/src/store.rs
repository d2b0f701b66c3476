//! Nullable ledger store: thread-safe in-memory storage for tests.

use stakeway_store::{check_wallet_key, LedgerStore, StoreError};
use stakeway_types::{Clock, StakeAmount, StakeEvent, StakeId};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::NullClock;

/// An in-memory ledger for testing.
///
/// Satisfies the same contract as the LMDB store. Can be switched into a
/// failing mode to exercise storage-error paths, and counts every call so
/// tests can assert that validation rejected a request before it got here.
pub struct NullLedgerStore {
    events: Mutex<Vec<StakeEvent>>,
    clock: Arc<dyn Clock>,
    failing: AtomicBool,
    calls: AtomicU64,
}

impl NullLedgerStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(NullClock::new(0)))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            clock,
            failing: AtomicBool::new(false),
            calls: AtomicU64::new(0),
        }
    }

    /// Make every subsequent call fail with a backend error (or stop failing).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of trait calls received so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every recorded event, in insertion order.
    pub fn events(&self) -> Vec<StakeEvent> {
        self.lock().map(|events| events.clone()).unwrap_or_default()
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store set to fail".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StakeEvent>>, StoreError> {
        self.events
            .lock()
            .map_err(|_| StoreError::Backend("null store mutex poisoned".to_string()))
    }
}

impl Default for NullLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for NullLedgerStore {
    fn record_stake(
        &self,
        wallet_address: &str,
        amount: StakeAmount,
    ) -> Result<StakeEvent, StoreError> {
        self.enter()?;
        check_wallet_key(wallet_address)?;

        let mut events = self.lock()?;
        let id = StakeId::new(events.len() as u64 + 1);
        let event = StakeEvent {
            id,
            wallet_address: wallet_address.to_string(),
            amount,
            recorded_at: self.clock.now(),
        };
        events.push(event.clone());
        Ok(event)
    }

    fn total_staked(&self, wallet_address: &str) -> Result<StakeAmount, StoreError> {
        self.enter()?;
        let events = self.lock()?;
        StakeAmount::checked_sum(
            events
                .iter()
                .filter(|e| e.wallet_address == wallet_address)
                .map(|e| e.amount),
        )
        .ok_or_else(|| StoreError::Overflow(format!("total staked for {wallet_address}")))
    }

    fn stake_count(&self) -> Result<u64, StoreError> {
        self.enter()?;
        Ok(self.lock()?.len() as u64)
    }
}

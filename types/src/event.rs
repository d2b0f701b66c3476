//! The stake event record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{StakeAmount, Timestamp};

/// Store-assigned identity of a stake event. Monotonically increasing, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StakeId(u64);

impl StakeId {
    /// The first id handed out by an empty ledger.
    pub const FIRST: Self = Self(1);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` once the id space is exhausted.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for StakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One immutable deposit recorded against a wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeEvent {
    pub id: StakeId,
    pub wallet_address: String,
    pub amount: StakeAmount,
    /// Assigned by the store at insertion, never by the caller.
    pub recorded_at: Timestamp,
}

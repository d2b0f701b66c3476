//! Reward engine: the staking business rules.
//!
//! `reward(w) = total_staked(w) × 5%`
//!
//! This crate handles:
//! - Validating stake requests before they reach storage
//! - Delegating appends and aggregates to a [`LedgerStore`](stakeway_store::LedgerStore)
//! - Deriving rewards from the aggregate; nothing is cached or persisted here

pub mod engine;
pub mod error;
pub mod rate;

pub use engine::{RewardEngine, StakeService};
pub use error::RewardError;
pub use rate::{reward_for, REWARD_RATE_BPS};

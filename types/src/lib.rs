//! Fundamental types for the Stakeway staking ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! wallet addresses, fixed-point stake amounts, timestamps and the stake event record.

pub mod address;
pub mod amount;
pub mod error;
pub mod event;
pub mod time;

pub use address::WalletAddress;
pub use amount::StakeAmount;
pub use error::ValidationError;
pub use event::{StakeEvent, StakeId};
pub use time::{Clock, SystemClock, Timestamp};

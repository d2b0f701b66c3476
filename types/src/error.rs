//! Validation errors for caller-supplied input.

use thiserror::Error;

/// Caller input violates a documented precondition.
///
/// Raised before any storage interaction and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid wallet address: {0:?}")]
    InvalidAddress(String),

    #[error("wallet address is required")]
    EmptyAddress,

    #[error("amount must be non-negative")]
    NegativeAmount,

    #[error("amount must be a finite number")]
    NonFiniteAmount,

    #[error("amount exceeds the maximum of {} tokens", crate::StakeAmount::MAX_TOKENS)]
    AmountTooLarge,
}

//! Stake amount type.
//!
//! Amounts are represented as fixed-point integers (u128) to avoid floating-point drift
//! when many deposits are summed. The smallest unit is 1 raw = 10^-9 token. Callers speak
//! decimal numbers; conversion happens once at the edge via [`StakeAmount::from_decimal`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ValidationError;

/// A non-negative amount of staked tokens, in raw units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StakeAmount(u128);

impl StakeAmount {
    pub const ZERO: Self = Self(0);

    /// Decimal places carried by the raw representation.
    pub const DECIMALS: u32 = 9;

    /// Raw units per whole token.
    pub const RAW_PER_TOKEN: u128 = 10u128.pow(Self::DECIMALS);

    /// Largest amount accepted for a single deposit, in whole tokens.
    pub const MAX_TOKENS: u128 = 1_000_000_000_000_000_000;

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// An amount of whole tokens.
    pub const fn from_tokens(tokens: u64) -> Self {
        Self(tokens as u128 * Self::RAW_PER_TOKEN)
    }

    /// Convert a caller-supplied decimal amount, rounding to the nearest raw unit.
    ///
    /// Rejects negative, NaN/infinite and out-of-range values.
    pub fn from_decimal(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteAmount);
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeAmount);
        }
        if value > Self::MAX_TOKENS as f64 {
            return Err(ValidationError::AmountTooLarge);
        }
        let raw = (value * Self::RAW_PER_TOKEN as f64).round();
        Ok(Self(raw as u128))
    }

    /// Decimal view of this amount, for serialization at the API boundary.
    pub fn to_decimal(self) -> f64 {
        let whole = self.0 / Self::RAW_PER_TOKEN;
        let frac = self.0 % Self::RAW_PER_TOKEN;
        whole as f64 + frac as f64 / Self::RAW_PER_TOKEN as f64
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Sum an iterator of amounts, returning `None` on overflow.
    pub fn checked_sum<I>(iter: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        iter.into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// `self * numerator / denominator`, rounded down, without intermediate overflow
    /// as long as `numerator <= denominator`.
    pub fn mul_ratio_floor(self, numerator: u128, denominator: u128) -> Self {
        let whole = self.0 / denominator;
        let rem = self.0 % denominator;
        Self(whole * numerator + rem * numerator / denominator)
    }
}

impl fmt::Display for StakeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::RAW_PER_TOKEN;
        let frac = self.0 % Self::RAW_PER_TOKEN;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{:0width$}", frac, width = Self::DECIMALS as usize);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

//! The flat reward rate.

use stakeway_types::StakeAmount;

/// Reward rate: 5% (500 basis points) of total stake.
pub const REWARD_RATE_BPS: u128 = 500;

const BPS_DENOMINATOR: u128 = 10_000;

/// Reward owed on `total_staked`.
///
/// Integer math in raw units, rounded down to the raw unit.
pub fn reward_for(total_staked: StakeAmount) -> StakeAmount {
    total_staked.mul_ratio_floor(REWARD_RATE_BPS, BPS_DENOMINATOR)
}

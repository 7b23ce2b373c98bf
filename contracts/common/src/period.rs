//! Period arithmetic shared by the staking pool contract and host tooling.
//!
//! Period 1 starts at pool creation. Every later period begins
//! `period_length` seconds after the previous one.

/// The only period in which deposits are admitted.
pub const STAKING_PERIOD: u32 = 1;

/// First period in which a staker may withdraw.
pub const UNSTAKE_MIN_PERIOD: u32 = 3;

/// First period in which the operator may sweep the pool.
pub const OPERATOR_MIN_PERIOD: u32 = 5;

/// Returns the 1-based period index for `now`.
///
/// Clock skew (`now < created_at`) counts as period 1. A zero
/// `period_length` is rejected at configuration time; here it pins the
/// pool to period 1 instead of dividing by zero.
pub fn current_period(now: u64, created_at: u64, period_length: u64) -> u32 {
    if period_length == 0 {
        return STAKING_PERIOD;
    }
    let elapsed = now.saturating_sub(created_at) / period_length;
    u32::try_from(elapsed)
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

pub fn is_staking_open(period: u32) -> bool {
    period == STAKING_PERIOD
}

pub fn is_unstake_mature(period: u32) -> bool {
    period >= UNSTAKE_MIN_PERIOD
}

pub fn is_operator_window(period: u32) -> bool {
    period >= OPERATOR_MIN_PERIOD
}

//! Reward tranche schedule for period-based staking pools.
//!
//! The reward budget is split 20 / 30 / 50 percent into three tranches that
//! become claimable at periods 3, 4 and 5. An unstaking position receives a
//! pro-rata slice of every released tranche, measured against the total
//! still staked at that instant, so earlier withdrawals shrink what later
//! ones can draw.

use soroban_sdk::contracttype;

use crate::period::{OPERATOR_MIN_PERIOD, UNSTAKE_MIN_PERIOD};

pub const FIRST_TRANCHE_PERCENT: i128 = 20;
pub const SECOND_TRANCHE_PERCENT: i128 = 30;
const PERCENT: i128 = 100;

/// Period at which each tranche, in order, is released.
pub const TRANCHE_RELEASE_PERIODS: [u32; 3] =
    [UNSTAKE_MIN_PERIOD, UNSTAKE_MIN_PERIOD + 1, OPERATOR_MIN_PERIOD];

/// Unclaimed remainder of each reward tranche.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardTranches {
    pub first: i128,
    pub second: i128,
    pub third: i128,
}

/// Outcome of settling one withdrawal against the schedule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub reward: i128,
    pub remaining: RewardTranches,
}

// ── Wide arithmetic ──────────────────────────────────────────────────────────

/// Full 256-bit product of `a * b` as `(high, low)` words.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a_lo, a_hi) = (a & MASK, a >> 64);
    let (b_lo, b_hi) = (b & MASK, b >> 64);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let low = (ll & MASK) | ((mid & MASK) << 64);
    let high = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (high, low)
}

/// `floor(a * b / d)` without overflowing the intermediate product.
///
/// Returns `None` when `d == 0` or the quotient does not fit in `u128`.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let (high, low) = widening_mul(a, b);
    if high == 0 {
        return Some(low / d);
    }
    if high >= d {
        return None;
    }

    // Shift-subtract long division of `high:low` by `d`. The running
    // remainder stays below `d`; `carry` holds its 129th bit after a shift.
    let mut rem = high;
    let mut quotient: u128 = 0;
    for bit in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((low >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quotient |= 1;
        }
    }
    Some(quotient)
}

/// Signed wrapper over [`mul_div_floor`] for non-negative token amounts.
fn share_of(amount: i128, numerator: i128, denominator: i128) -> Option<i128> {
    let a = u128::try_from(amount).ok()?;
    let b = u128::try_from(numerator).ok()?;
    let d = u128::try_from(denominator).ok()?;
    i128::try_from(mul_div_floor(a, b, d)?).ok()
}

impl RewardTranches {
    /// Splits `reward_pool` into tranches. The third tranche absorbs the
    /// rounding of the first two so the parts always sum to the whole.
    ///
    /// Returns `None` for a negative pool.
    pub fn split(reward_pool: i128) -> Option<Self> {
        if reward_pool < 0 {
            return None;
        }
        let first = share_of(reward_pool, FIRST_TRANCHE_PERCENT, PERCENT)?;
        let second = share_of(reward_pool, SECOND_TRANCHE_PERCENT, PERCENT)?;
        let third = reward_pool - first - second;
        Some(Self {
            first,
            second,
            third,
        })
    }

    pub fn empty() -> Self {
        Self {
            first: 0,
            second: 0,
            third: 0,
        }
    }

    fn to_array(&self) -> [i128; 3] {
        [self.first, self.second, self.third]
    }

    fn from_array(parts: [i128; 3]) -> Self {
        Self {
            first: parts[0],
            second: parts[1],
            third: parts[2],
        }
    }

    /// Total unclaimed reward across all tranches, released or not.
    pub fn total(&self) -> i128 {
        self.first
            .saturating_add(self.second)
            .saturating_add(self.third)
    }

    /// Unclaimed reward that has been released by `period`.
    pub fn released(&self, period: u32) -> i128 {
        self.to_array()
            .iter()
            .zip(TRANCHE_RELEASE_PERIODS.iter())
            .filter(|(_, release)| period >= **release)
            .fold(0i128, |acc, (amount, _)| acc.saturating_add(*amount))
    }

    /// Settles a withdrawal of `stake` out of `total_staked` at `period`.
    ///
    /// Each released tranche pays `floor(remaining * stake / total_staked)`,
    /// computed with a 256-bit intermediate; rounding residue stays in the
    /// tranche. The last staker out (`stake == total_staked`) takes every
    /// released tranche whole.
    ///
    /// Returns `None` when `stake` is not a positive part of
    /// `total_staked`, or when a tranche has gone negative.
    pub fn settle(&self, period: u32, stake: i128, total_staked: i128) -> Option<Settlement> {
        if stake <= 0 || total_staked < stake {
            return None;
        }

        let mut parts = self.to_array();
        let mut reward: i128 = 0;
        for (part, release) in parts.iter_mut().zip(TRANCHE_RELEASE_PERIODS.iter()) {
            if period < *release {
                continue;
            }
            let share = if stake == total_staked {
                *part
            } else {
                share_of(*part, stake, total_staked)?
            };
            *part -= share;
            reward = reward.checked_add(share)?;
        }

        Some(Settlement {
            reward,
            remaining: Self::from_array(parts),
        })
    }
}

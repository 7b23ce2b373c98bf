#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the pool is created and funded.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub operator: Address,
    pub token: Address,
    pub period_length: u64,
    pub reward_pool: i128,
    pub timestamp: u64,
}

/// Fired when a user deposits stake.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub period: u32,
    pub timestamp: u64,
}

/// Fired when a user withdraws principal plus reward.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakedEvent {
    pub staker: Address,
    pub principal: i128,
    pub reward: i128,
    pub new_total_staked: i128,
    pub period: u32,
    pub timestamp: u64,
}

/// Fired when the operator sweeps the remaining pool balance.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SweptEvent {
    pub operator: Address,
    pub amount: i128,
    pub period: u32,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    operator: Address,
    token: Address,
    period_length: u64,
    reward_pool: i128,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            operator,
            token,
            period_length,
            reward_pool,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(env: &Env, staker: Address, amount: i128, new_total_staked: i128, period: u32) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            amount,
            new_total_staked,
            period,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unstaked(
    env: &Env,
    staker: Address,
    principal: i128,
    reward: i128,
    new_total_staked: i128,
    period: u32,
) {
    env.events().publish(
        (symbol_short!("UNSTAKED"), staker.clone()),
        UnstakedEvent {
            staker,
            principal,
            reward,
            new_total_staked,
            period,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_swept(env: &Env, operator: Address, amount: i128, period: u32) {
    env.events().publish(
        (symbol_short!("SWEPT"), operator.clone()),
        SweptEvent {
            operator,
            amount,
            period,
            timestamp: env.ledger().timestamp(),
        },
    );
}

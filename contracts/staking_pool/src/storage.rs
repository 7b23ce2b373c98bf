use common::reward_schedule::RewardTranches;
use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::{ContractError, PoolConfig};

// ── Storage key constants ────────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const TRANCHES: Symbol = symbol_short!("TRANCHES");
const TOTAL_STAKED: Symbol = symbol_short!("TOT_STK");

// Per-user persistent storage uses tuple keys:  (prefix, user_address)
const POSITION: Symbol = symbol_short!("POS");

const DAY_IN_LEDGERS: u32 = 17_280;
const TTL_EXTEND_TO: u32 = 30 * DAY_IN_LEDGERS;
const TTL_THRESHOLD: u32 = TTL_EXTEND_TO - DAY_IN_LEDGERS;

fn position_key(user: &Address) -> (Symbol, Address) {
    (POSITION, user.clone())
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Pool ─────────────────────────────────────────────────────────────────────

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&CONFIG)
}

pub fn get_config(env: &Env) -> Option<PoolConfig> {
    env.storage().instance().get(&CONFIG)
}

pub fn load_config(env: &Env) -> Result<PoolConfig, ContractError> {
    get_config(env).ok_or(ContractError::NotInitialized)
}

pub fn set_config(env: &Env, config: &PoolConfig) {
    env.storage().instance().set(&CONFIG, config);
}

pub fn get_tranches(env: &Env) -> RewardTranches {
    env.storage()
        .instance()
        .get(&TRANCHES)
        .unwrap_or(RewardTranches::empty())
}

pub fn set_tranches(env: &Env, tranches: &RewardTranches) {
    env.storage().instance().set(&TRANCHES, tranches);
}

pub fn get_total_staked(env: &Env) -> i128 {
    env.storage().instance().get(&TOTAL_STAKED).unwrap_or(0)
}

pub fn set_total_staked(env: &Env, total: i128) {
    env.storage().instance().set(&TOTAL_STAKED, &total);
}

// ── Positions ────────────────────────────────────────────────────────────────

/// Staked balance of `user`, or `None` while the user is idle.
pub fn get_position(env: &Env, user: &Address) -> Option<i128> {
    let key = position_key(user);
    let balance: Option<i128> = env.storage().persistent().get(&key);
    if balance.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    balance
}

pub fn set_position(env: &Env, user: &Address, balance: i128) {
    let key = position_key(user);
    env.storage().persistent().set(&key, &balance);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn remove_position(env: &Env, user: &Address) {
    env.storage().persistent().remove(&position_key(user));
}

#![no_std]

pub mod events;
mod storage;

use common::period::{self, STAKING_PERIOD};
use common::reward_schedule::RewardTranches;
use soroban_sdk::{contract, contractimpl, contracttype, token, Address, Env};

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidConfig = 4,
    InvalidAmount = 5,
    WrongPeriodForStaking = 6,
    AlreadyStaking = 7,
    NotStaking = 8,
    PeriodNotMature = 9,
    OperatorGateClosed = 10,
    TransferFailed = 11,
    ArithmeticOverflow = 12,
}

// ── Public-facing types (re-exported for test consumers) ─────────────────────

/// Immutable pool parameters, fixed by `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    /// Deployer; the only address allowed to sweep the pool.
    pub operator: Address,
    /// SEP-41 token held in custody.
    pub token: Address,
    /// Seconds per accounting period.
    pub period_length: u64,
    /// Reward budget pulled from the operator at creation.
    pub reward_pool: i128,
    /// Ledger timestamp at which period 1 began.
    pub created_at: u64,
}

/// Snapshot of a user's position returned by `get_position`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub is_staking: bool,
    pub staking_balance: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingPoolContract;

#[contractimpl]
impl StakingPoolContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Create the pool and fund it.
    ///
    /// * `operator`      – deployer; pays in `reward_pool` and may later sweep.
    /// * `token`         – SAC address of the custodied token.
    /// * `period_length` – seconds per period, must be non-zero.
    /// * `reward_pool`   – reward budget, pulled from `operator` right away so
    ///   the pool balance always covers stakes plus unclaimed rewards.
    pub fn initialize(
        env: Env,
        operator: Address,
        token: Address,
        period_length: u64,
        reward_pool: i128,
    ) -> Result<(), ContractError> {
        if storage::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        operator.require_auth();

        if period_length == 0 {
            return Err(ContractError::InvalidConfig);
        }
        let tranches = RewardTranches::split(reward_pool).ok_or(ContractError::InvalidConfig)?;

        if reward_pool > 0 {
            Self::transfer(
                &env,
                &token,
                &operator,
                &env.current_contract_address(),
                reward_pool,
            )?;
        }

        let config = PoolConfig {
            operator: operator.clone(),
            token: token.clone(),
            period_length,
            reward_pool,
            created_at: env.ledger().timestamp(),
        };
        storage::set_config(&env, &config);
        storage::set_tranches(&env, &tranches);
        storage::set_total_staked(&env, 0);
        storage::bump_instance(&env);

        events::publish_initialized(&env, operator, token, period_length, reward_pool);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` tokens. Only admitted during period 1, once per
    /// user. The staker must have approved the pool for at least `amount`.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        let config = storage::load_config(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        let period = Self::period_of(&env, &config);
        if !period::is_staking_open(period) {
            return Err(ContractError::WrongPeriodForStaking);
        }
        if storage::get_position(&env, &staker).is_some() {
            return Err(ContractError::AlreadyStaking);
        }
        let new_total = storage::get_total_staked(&env)
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;

        // Pull tokens through the staker's allowance.
        let pool = env.current_contract_address();
        match token::Client::new(&env, &config.token).try_transfer_from(
            &pool,
            &staker,
            &pool,
            &amount,
        ) {
            Ok(Ok(())) => {}
            _ => return Err(ContractError::TransferFailed),
        }

        storage::set_position(&env, &staker, amount);
        storage::set_total_staked(&env, new_total);
        storage::bump_instance(&env);

        events::publish_staked(&env, staker, amount, new_total, period);

        Ok(())
    }

    // ── Unstaking ───────────────────────────────────────────────────────────

    /// Withdraw the whole position plus its reward. Admitted from period 3.
    ///
    /// The reward is settled eagerly against the tranches and total stake as
    /// they stand now, so it depends on who withdrew before. Returns the
    /// reward paid on top of the principal.
    pub fn unstake(env: Env, staker: Address) -> Result<i128, ContractError> {
        let config = storage::load_config(&env)?;
        staker.require_auth();

        let stake = storage::get_position(&env, &staker).ok_or(ContractError::NotStaking)?;
        let period = Self::period_of(&env, &config);
        if !period::is_unstake_mature(period) {
            return Err(ContractError::PeriodNotMature);
        }

        let total_staked = storage::get_total_staked(&env);
        let settlement = storage::get_tranches(&env)
            .settle(period, stake, total_staked)
            .ok_or(ContractError::ArithmeticOverflow)?;
        let payout = stake
            .checked_add(settlement.reward)
            .ok_or(ContractError::ArithmeticOverflow)?;
        let new_total = total_staked - stake;

        // Clear the position before paying out (checks-effects-interactions).
        storage::remove_position(&env, &staker);
        storage::set_total_staked(&env, new_total);
        storage::set_tranches(&env, &settlement.remaining);
        storage::bump_instance(&env);

        Self::transfer(
            &env,
            &config.token,
            &env.current_contract_address(),
            &staker,
            payout,
        )?;

        events::publish_unstaked(&env, staker, stake, settlement.reward, new_total, period);

        Ok(settlement.reward)
    }

    // ── Operator ────────────────────────────────────────────────────────────

    /// Sweep the pool's entire token balance to the operator.
    ///
    /// Admitted from period 5 once no position remains. Returns the amount
    /// swept; sweeping a drained pool returns 0 and changes nothing.
    pub fn bank_withdraw(env: Env, operator: Address) -> Result<i128, ContractError> {
        let config = storage::load_config(&env)?;
        operator.require_auth();

        if operator != config.operator {
            return Err(ContractError::Unauthorized);
        }
        let period = Self::period_of(&env, &config);
        if !period::is_operator_window(period) || storage::get_total_staked(&env) != 0 {
            return Err(ContractError::OperatorGateClosed);
        }

        let pool = env.current_contract_address();
        let balance = token::Client::new(&env, &config.token).balance(&pool);
        if balance <= 0 {
            return Ok(0);
        }

        storage::set_tranches(&env, &RewardTranches::empty());
        storage::bump_instance(&env);

        Self::transfer(&env, &config.token, &pool, &operator, balance)?;

        events::publish_swept(&env, operator, balance, period);

        Ok(balance)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Current 1-based period. An uninitialized pool reports period 1.
    pub fn get_current_period(env: Env) -> u32 {
        storage::get_config(&env)
            .map(|config| Self::period_of(&env, &config))
            .unwrap_or(STAKING_PERIOD)
    }

    pub fn get_position(env: Env, user: Address) -> Position {
        match storage::get_position(&env, &user) {
            Some(staking_balance) => Position {
                is_staking: true,
                staking_balance,
            },
            None => Position {
                is_staking: false,
                staking_balance: 0,
            },
        }
    }

    /// Reward `unstake` would pay `user` at the current timestamp, without
    /// mutating state. Zero for idle users and before period 3; fails with
    /// the same error `unstake` would raise if settlement is impossible.
    pub fn get_pending_reward(env: Env, user: Address) -> Result<i128, ContractError> {
        let Some(config) = storage::get_config(&env) else {
            return Ok(0);
        };
        let period = Self::period_of(&env, &config);
        if !period::is_unstake_mature(period) {
            return Ok(0);
        }
        let Some(stake) = storage::get_position(&env, &user) else {
            return Ok(0);
        };
        storage::get_tranches(&env)
            .settle(period, stake, storage::get_total_staked(&env))
            .map(|settlement| settlement.reward)
            .ok_or(ContractError::ArithmeticOverflow)
    }

    /// Return the sum of all currently staked tokens.
    pub fn get_total_staked(env: Env) -> i128 {
        storage::get_total_staked(&env)
    }

    /// Unclaimed reward across all tranches, released or not.
    pub fn get_reward_remaining(env: Env) -> i128 {
        storage::get_tranches(&env).total()
    }

    pub fn get_tranches(env: Env) -> RewardTranches {
        storage::get_tranches(&env)
    }

    pub fn get_config(env: Env) -> Result<PoolConfig, ContractError> {
        storage::load_config(&env)
    }

    pub fn get_operator(env: Env) -> Result<Address, ContractError> {
        storage::load_config(&env).map(|config| config.operator)
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::is_initialized(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn period_of(env: &Env, config: &PoolConfig) -> u32 {
        period::current_period(
            env.ledger().timestamp(),
            config.created_at,
            config.period_length,
        )
    }

    /// Transfer through the token contract, surfacing any rejection as
    /// `TransferFailed` instead of trapping.
    fn transfer(
        env: &Env,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        match token::Client::new(env, token).try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(ContractError::TransferFailed),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_scenarios;

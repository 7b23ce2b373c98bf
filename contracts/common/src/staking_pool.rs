//! Host-side model of the period-based staking pool.
//!
//! This module is `std`-only. It mirrors the on-chain contract so that
//! off-chain tooling and simulations can run the same state machine against
//! an injected [`Clock`] and [`FungibleLedger`]. [`SharedStakingPool`] puts
//! the aggregate behind one mutex for callers on multiple threads.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::period::{current_period, is_operator_window, is_staking_open, is_unstake_mature};
use crate::reward_schedule::RewardTranches;

// ── Clock ────────────────────────────────────────────────────────────────────

/// Source of the current time in seconds.
pub trait Clock {
    fn now(&self) -> u64;
}

/// Wall-clock time since the Unix epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually driven clock. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(seconds))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ── Fungible ledger ──────────────────────────────────────────────────────────

/// Errors surfaced by a [`FungibleLedger`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LedgerError {
    /// Negative transfer amount.
    InvalidAmount,
    /// The source account does not hold enough tokens.
    InsufficientBalance,
    /// The spender's allowance does not cover the transfer.
    InsufficientAllowance,
}

/// The slice of a fungible token the pool transacts against.
pub trait FungibleLedger {
    fn balance(&self, owner: &str) -> i128;

    fn transfer(&mut self, from: &str, to: &str, amount: i128) -> Result<(), LedgerError>;

    /// Moves `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: i128,
    ) -> Result<(), LedgerError>;
}

/// In-memory token with balances and approve-then-pull allowances.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    balances: BTreeMap<String, i128>,
    allowances: BTreeMap<(String, String), i128>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, to: &str, amount: i128) {
        let balance = self.balances.entry(to.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn approve(&mut self, owner: &str, spender: &str, amount: i128) {
        self.allowances
            .insert((owner.to_string(), spender.to_string()), amount);
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> i128 {
        self.allowances
            .get(&(owner.to_string(), spender.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn debit_credit(&mut self, from: &str, to: &str, amount: i128) -> Result<(), LedgerError> {
        if amount < 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let from_balance = self.balance(from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        self.balances.insert(from.to_string(), from_balance - amount);
        self.mint(to, amount);
        Ok(())
    }
}

impl FungibleLedger for InMemoryLedger {
    fn balance(&self, owner: &str) -> i128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &str, to: &str, amount: i128) -> Result<(), LedgerError> {
        self.debit_credit(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: i128,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance);
        }
        self.debit_credit(from, to, amount)?;
        self.approve(from, spender, allowance - amount);
        Ok(())
    }
}

// ── Pool ─────────────────────────────────────────────────────────────────────

/// Rejections raised by [`StakingPool`]. Every rejection leaves the pool and
/// the ledger exactly as they were.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PoolError {
    InvalidConfig,
    Unauthorized,
    InvalidAmount,
    WrongPeriodForStaking,
    AlreadyStaking,
    NotStaking,
    PeriodNotMature,
    OperatorGateClosed,
    TransferFailed(LedgerError),
    ArithmeticOverflow,
    /// A thread panicked while holding the shared pool lock.
    Poisoned,
}

impl From<LedgerError> for PoolError {
    fn from(err: LedgerError) -> Self {
        PoolError::TransferFailed(err)
    }
}

/// Construction-time options.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    pub operator: String,
    pub period_length: u64,
    pub reward_pool: i128,
}

/// Read view of one user's position.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Position {
    pub is_staking: bool,
    pub staking_balance: i128,
}

/// The pool aggregate: configuration, reward bookkeeping and positions.
#[derive(Debug)]
pub struct StakingPool<L, C> {
    account: String,
    config: PoolConfig,
    created_at: u64,
    tranches: RewardTranches,
    total_staked: i128,
    positions: BTreeMap<String, i128>,
    ledger: L,
    clock: C,
}

impl<L: FungibleLedger, C: Clock> StakingPool<L, C> {
    /// Creates the pool under ledger account `account` and pulls the reward
    /// budget from the operator.
    pub fn create(
        account: impl Into<String>,
        config: PoolConfig,
        mut ledger: L,
        clock: C,
    ) -> Result<Self, PoolError> {
        if config.period_length == 0 {
            return Err(PoolError::InvalidConfig);
        }
        let tranches = RewardTranches::split(config.reward_pool).ok_or(PoolError::InvalidConfig)?;
        let account = account.into();

        if config.reward_pool > 0 {
            ledger.transfer(&config.operator, &account, config.reward_pool)?;
        }

        let created_at = clock.now();
        Ok(Self {
            account,
            config,
            created_at,
            tranches,
            total_staked: 0,
            positions: BTreeMap::new(),
            ledger,
            clock,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn current_period(&self) -> u32 {
        current_period(self.clock.now(), self.created_at, self.config.period_length)
    }

    pub fn position(&self, user: &str) -> Position {
        match self.positions.get(user) {
            Some(balance) => Position {
                is_staking: true,
                staking_balance: *balance,
            },
            None => Position::default(),
        }
    }

    pub fn total_staked(&self) -> i128 {
        self.total_staked
    }

    pub fn reward_remaining(&self) -> i128 {
        self.tranches.total()
    }

    pub fn tranches(&self) -> &RewardTranches {
        &self.tranches
    }

    /// Reward `unstake` would pay `user` right now. Zero while idle or
    /// immature; fails when `unstake` itself could not settle.
    pub fn pending_reward(&self, user: &str) -> Result<i128, PoolError> {
        let period = self.current_period();
        if !is_unstake_mature(period) {
            return Ok(0);
        }
        let Some(stake) = self.positions.get(user) else {
            return Ok(0);
        };
        self.tranches
            .settle(period, *stake, self.total_staked)
            .map(|s| s.reward)
            .ok_or(PoolError::ArithmeticOverflow)
    }

    pub fn stake(&mut self, user: &str, amount: i128) -> Result<(), PoolError> {
        if amount <= 0 {
            return Err(PoolError::InvalidAmount);
        }
        if !is_staking_open(self.current_period()) {
            return Err(PoolError::WrongPeriodForStaking);
        }
        if self.positions.contains_key(user) {
            return Err(PoolError::AlreadyStaking);
        }
        let new_total = self
            .total_staked
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow)?;

        let pool = self.account.clone();
        self.ledger.transfer_from(&pool, user, &pool, amount)?;

        self.positions.insert(user.to_string(), amount);
        self.total_staked = new_total;
        Ok(())
    }

    /// Returns the reward paid on top of the principal.
    pub fn unstake(&mut self, user: &str) -> Result<i128, PoolError> {
        let stake = *self.positions.get(user).ok_or(PoolError::NotStaking)?;
        let period = self.current_period();
        if !is_unstake_mature(period) {
            return Err(PoolError::PeriodNotMature);
        }

        let settlement = self
            .tranches
            .settle(period, stake, self.total_staked)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let payout = stake
            .checked_add(settlement.reward)
            .ok_or(PoolError::ArithmeticOverflow)?;

        let pool = self.account.clone();
        self.ledger.transfer(&pool, user, payout)?;

        self.positions.remove(user);
        self.total_staked -= stake;
        self.tranches = settlement.remaining;
        Ok(settlement.reward)
    }

    /// Sweeps the pool's whole balance to the operator. Returns the amount
    /// swept; a drained pool sweeps nothing.
    pub fn bank_withdraw(&mut self, caller: &str) -> Result<i128, PoolError> {
        if caller != self.config.operator {
            return Err(PoolError::Unauthorized);
        }
        if !is_operator_window(self.current_period()) || self.total_staked != 0 {
            return Err(PoolError::OperatorGateClosed);
        }

        let balance = self.ledger.balance(&self.account);
        if balance <= 0 {
            return Ok(0);
        }

        let pool = self.account.clone();
        self.ledger.transfer(&pool, caller, balance)?;
        self.tranches = RewardTranches::empty();
        Ok(balance)
    }
}

// ── Shared pool ──────────────────────────────────────────────────────────────

/// A [`StakingPool`] behind a single mutex. Each operation holds the lock
/// across its checks, the ledger call and the state write.
#[derive(Debug)]
pub struct SharedStakingPool<L, C> {
    inner: Arc<Mutex<StakingPool<L, C>>>,
}

impl<L, C> Clone for SharedStakingPool<L, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: FungibleLedger, C: Clock> SharedStakingPool<L, C> {
    pub fn new(pool: StakingPool<L, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Runs `f` with exclusive access to the pool.
    pub fn with<R>(&self, f: impl FnOnce(&mut StakingPool<L, C>) -> R) -> Result<R, PoolError> {
        let mut guard = self.inner.lock().map_err(|_| PoolError::Poisoned)?;
        Ok(f(&mut guard))
    }

    pub fn stake(&self, user: &str, amount: i128) -> Result<(), PoolError> {
        self.with(|pool| pool.stake(user, amount))?
    }

    pub fn unstake(&self, user: &str) -> Result<i128, PoolError> {
        self.with(|pool| pool.unstake(user))?
    }

    pub fn bank_withdraw(&self, caller: &str) -> Result<i128, PoolError> {
        self.with(|pool| pool.bank_withdraw(caller))?
    }

    pub fn current_period(&self) -> Result<u32, PoolError> {
        self.with(|pool| pool.current_period())
    }

    pub fn position(&self, user: &str) -> Result<Position, PoolError> {
        self.with(|pool| pool.position(user))
    }
}

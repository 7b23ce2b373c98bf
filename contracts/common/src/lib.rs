//! Shared arithmetic and host-side tooling for the staking pool contract.
//!
//! This crate provides:
//! - [`period`]: the period clock and the admission windows built on it.
//! - [`reward_schedule`]: the 20 / 30 / 50 reward tranche schedule and
//!   pro-rata settlement.
//! - [`staking_pool`]: a host-side model of the pool with an injectable
//!   clock and ledger (requires `std` feature).

#![cfg_attr(not(feature = "std"), no_std)]

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod period;
pub mod reward_schedule;
#[cfg(feature = "std")]
pub mod staking_pool;

pub use period::*;
pub use reward_schedule::*;

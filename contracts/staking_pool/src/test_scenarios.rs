extern crate std;

use soroban_sdk::{Address, Env};

use crate::test::{
    assert_conserved, assert_contract_err, balance, enter_period, funded_staker, setup, PERIOD,
    START,
};
use crate::{ContractError, StakingPoolContractClient};

// Reference run: 1_000 reward tokens over 60-second periods, user1 staking
// 1_000 and user2 staking 4_000 during period 1.

fn two_stakers() -> (
    Env,
    StakingPoolContractClient<'static>,
    Address, // operator
    Address, // token
    Address, // user1
    Address, // user2
) {
    let (env, client, operator, token) = setup(1_000);
    let user1 = funded_staker(&env, &client, &token, 1_000);
    let user2 = funded_staker(&env, &client, &token, 4_000);
    (env, client, operator, token, user1, user2)
}

#[test]
fn scenario_a_stake_in_first_period() {
    let (env, client, _operator, token, user1, _user2) = two_stakers();

    client.stake(&user1, &1_000);

    assert_eq!(balance(&env, &token, &user1), 0);
    assert_eq!(balance(&env, &token, &client.address), 2_000);
    assert!(client.get_position(&user1).is_staking);
    assert_conserved(&env, &client, &token);
}

#[test]
fn scenario_b_restake_in_second_period_rejected() {
    let (env, client, _operator, token, user1, _user2) = two_stakers();
    client.stake(&user1, &1_000);

    enter_period(&env, 2);
    assert_eq!(client.get_current_period(), 2);
    assert_contract_err!(
        client.try_stake(&user1, &1_000),
        ContractError::WrongPeriodForStaking
    );

    assert_eq!(client.get_position(&user1).staking_balance, 1_000);
    assert_eq!(balance(&env, &token, &client.address), 2_000);
    assert_conserved(&env, &client, &token);
}

#[test]
fn scenario_c_unstake_in_second_period_rejected() {
    let (env, client, _operator, token, user1, _user2) = two_stakers();
    client.stake(&user1, &1_000);

    enter_period(&env, 2);
    assert_contract_err!(client.try_unstake(&user1), ContractError::PeriodNotMature);

    assert!(client.get_position(&user1).is_staking);
    assert_eq!(balance(&env, &token, &user1), 0);
}

#[test]
fn scenario_d_first_unstake_in_third_period() {
    let (env, client, _operator, token, user1, user2) = two_stakers();
    client.stake(&user1, &1_000);
    client.stake(&user2, &4_000);

    enter_period(&env, 3);
    assert_eq!(client.unstake(&user1), 40);

    assert_eq!(balance(&env, &token, &user1), 1_040);
    assert!(!client.get_position(&user1).is_staking);
    assert_eq!(client.get_position(&user1).staking_balance, 0);
    assert_conserved(&env, &client, &token);
}

#[test]
fn scenario_e_full_program() {
    let (env, client, operator, token, user1, user2) = two_stakers();
    client.stake(&user1, &1_000);
    client.stake(&user2, &4_000);
    assert_eq!(balance(&env, &token, &client.address), 6_000);
    assert_conserved(&env, &client, &token);

    enter_period(&env, 3);
    assert_eq!(client.unstake(&user1), 40);
    assert_eq!(balance(&env, &token, &user1), 1_040);
    assert_conserved(&env, &client, &token);

    enter_period(&env, 4);
    assert_eq!(client.unstake(&user2), 460);
    assert_eq!(balance(&env, &token, &user2), 4_460);
    assert_conserved(&env, &client, &token);

    enter_period(&env, 5);
    let swept = client.bank_withdraw(&operator);
    assert_eq!(swept, 1_000 - 40 - 460);
    assert_eq!(balance(&env, &token, &operator), 500);
    assert_eq!(balance(&env, &token, &client.address), 0);
    assert_conserved(&env, &client, &token);
}

#[test]
fn scenario_f_operator_blocked_while_staked() {
    let (env, client, operator, token, user1, user2) = two_stakers();
    client.stake(&user1, &1_000);
    client.stake(&user2, &4_000);

    enter_period(&env, 3);
    client.unstake(&user1);

    enter_period(&env, 4);
    assert_contract_err!(
        client.try_bank_withdraw(&operator),
        ContractError::OperatorGateClosed
    );

    // Still closed at period 5 while user2 holds a position.
    enter_period(&env, 5);
    assert_contract_err!(
        client.try_bank_withdraw(&operator),
        ContractError::OperatorGateClosed
    );
    assert_eq!(balance(&env, &token, &operator), 0);
    assert_conserved(&env, &client, &token);
}

// ── Token-scale amounts ───────────────────────────────────────────────────────

const UNIT: i128 = 1_000_000_000_000_000_000;

#[test]
fn scenario_e_at_eighteen_decimals() {
    let (env, client, operator, token) = setup(1_000 * UNIT);
    let user1 = funded_staker(&env, &client, &token, 1_000 * UNIT);
    let user2 = funded_staker(&env, &client, &token, 4_000 * UNIT);
    client.stake(&user1, &(1_000 * UNIT));
    client.stake(&user2, &(4_000 * UNIT));

    enter_period(&env, 3);
    assert_eq!(client.get_pending_reward(&user1), 40 * UNIT);
    assert_eq!(client.unstake(&user1), 40 * UNIT);
    assert_conserved(&env, &client, &token);

    enter_period(&env, 4);
    assert_eq!(client.unstake(&user2), 460 * UNIT);
    assert_conserved(&env, &client, &token);

    enter_period(&env, 5);
    assert_eq!(client.bank_withdraw(&operator), 500 * UNIT);
    assert_eq!(balance(&env, &token, &client.address), 0);
}

#[test]
fn near_limit_stakes_can_always_exit() {
    let big = i128::MAX / 8;
    let (env, client, operator, token) = setup(big);
    let user1 = funded_staker(&env, &client, &token, big);
    let user2 = funded_staker(&env, &client, &token, big / 3);
    client.stake(&user1, &big);
    client.stake(&user2, &(big / 3));

    enter_period(&env, 5);
    let paid = client.unstake(&user2) + client.unstake(&user1);
    let swept = client.bank_withdraw(&operator);

    assert_eq!(paid + swept, big);
    assert_eq!(balance(&env, &token, &client.address), 0);
}

// ── Host model parity ─────────────────────────────────────────────────────────

#[test]
fn contract_and_host_model_agree() {
    use common::staking_pool::{InMemoryLedger, ManualClock, PoolConfig, StakingPool};

    let reward_pool = 1_000 * UNIT + 7;
    let stakes = [1_000 * UNIT + 1, 4_000 * UNIT + 3, 333];
    let exits = [3u64, 4, 4];

    let (env, client, operator, token) = setup(reward_pool);
    let users: std::vec::Vec<Address> = stakes
        .iter()
        .map(|amount| funded_staker(&env, &client, &token, *amount))
        .collect();

    let clock = ManualClock::new(START);
    let mut ledger = InMemoryLedger::new();
    ledger.mint("operator", reward_pool);
    for (i, amount) in stakes.iter().enumerate() {
        let name = std::format!("user{i}");
        ledger.mint(&name, *amount);
        ledger.approve(&name, "pool", *amount);
    }
    let config = PoolConfig {
        operator: "operator".into(),
        period_length: PERIOD,
        reward_pool,
    };
    let mut host = StakingPool::create("pool", config, ledger, clock.clone()).unwrap();

    for (i, (user, amount)) in users.iter().zip(stakes.iter()).enumerate() {
        client.stake(user, amount);
        host.stake(&std::format!("user{i}"), *amount).unwrap();
    }

    for (i, (user, period)) in users.iter().zip(exits.iter()).enumerate() {
        enter_period(&env, *period);
        clock.set(START + (period - 1) * PERIOD);
        let name = std::format!("user{i}");
        assert_eq!(client.unstake(user), host.unstake(&name).unwrap());
        assert_eq!(client.get_reward_remaining(), host.reward_remaining());
        assert_eq!(client.get_tranches(), *host.tranches());
    }

    enter_period(&env, 5);
    clock.set(START + 4 * PERIOD);
    assert_eq!(client.bank_withdraw(&operator), host.bank_withdraw("operator").unwrap());
    assert_eq!(client.bank_withdraw(&operator), host.bank_withdraw("operator").unwrap());
}

use soroban_sdk::{contracttype, Env, I256};

use crate::ContractError;

/// Scale applied to `reward_per_token` so per-unit rewards keep 18 decimal
/// places through integer division.
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

// ── State records ───────────────────────────────────────────────────────────

/// Ledger-wide accrual state.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GlobalState {
    /// Sum of every account's `balance`.
    pub total_staked: i128,
    /// Reward units emitted per second while a window is running.
    pub reward_rate: i128,
    /// Timestamp at which the current funding window ends (0 = never funded).
    pub finish_at: u64,
    /// Timestamp the accumulator was last advanced to.
    pub last_update: u64,
    /// Cumulative reward per staked unit, scaled by `PRECISION`.
    pub reward_per_token_stored: i128,
    /// Length in seconds of each funding window.
    pub duration: u64,
    /// Reward scheduled by funding windows and not yet paid out. Covers both
    /// what stakers have accrued and what the running window still has to
    /// emit.
    pub reward_committed: i128,
}

/// Per-account checkpoint.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccountState {
    pub balance: i128,
    /// `reward_per_token_stored` as of this account's last checkpoint.
    pub reward_per_token_paid: i128,
    /// Earned and not yet claimed.
    pub rewards: i128,
}

// ── Core reward engine ──────────────────────────────────────────────────────

/// `a × b / c` with a 256-bit intermediate. Only the quotient has to fit
/// back into `i128`.
fn mul_div(env: &Env, a: i128, b: i128, c: i128) -> Result<i128, ContractError> {
    I256::from_i128(env, a)
        .mul(&I256::from_i128(env, b))
        .div(&I256::from_i128(env, c))
        .to_i128()
        .ok_or(ContractError::Overflow)
}

/// The latest instant rewards are still being emitted for.
///
/// Before the first funding `finish_at` is zero, so this is zero too and the
/// accumulator cannot advance.
pub fn last_time_reward_applicable(finish_at: u64, now: u64) -> u64 {
    now.min(finish_at)
}

/// Project `reward_per_token_stored` forward to `now` without mutating.
///
/// ```text
/// Δrpt = reward_rate × elapsed_seconds × PRECISION / total_staked
/// ```
///
/// With nothing staked the stored value is returned unchanged: whatever was
/// emitted over that interval is not credited to anyone.
pub fn reward_per_token(env: &Env, state: &GlobalState, now: u64) -> Result<i128, ContractError> {
    if state.total_staked <= 0 {
        return Ok(state.reward_per_token_stored);
    }

    let applicable = last_time_reward_applicable(state.finish_at, now);
    let elapsed = applicable.saturating_sub(state.last_update);

    // Bounded by the funded schedule, so it fits before scaling.
    let emitted = i128::from(elapsed)
        .checked_mul(state.reward_rate)
        .ok_or(ContractError::Overflow)?;
    let delta = mul_div(env, emitted, PRECISION, state.total_staked)?;

    state
        .reward_per_token_stored
        .checked_add(delta)
        .ok_or(ContractError::Overflow)
}

/// Advance the global accumulator to `now`.
///
/// Calling this twice with the same `now` is a no-op the second time.
pub fn update_global(
    env: &Env,
    state: GlobalState,
    now: u64,
) -> Result<GlobalState, ContractError> {
    let reward_per_token_stored = reward_per_token(env, &state, now)?;
    Ok(GlobalState {
        reward_per_token_stored,
        last_update: last_time_reward_applicable(state.finish_at, now),
        ..state
    })
}

/// Total claimable for an account against the given accumulator value.
///
/// ```text
/// earned = balance × (rpt − rpt_paid) / PRECISION + rewards
/// ```
pub fn earned(
    env: &Env,
    account: &AccountState,
    reward_per_token: i128,
) -> Result<i128, ContractError> {
    let delta = reward_per_token
        .checked_sub(account.reward_per_token_paid)
        .ok_or(ContractError::Overflow)?;
    let new_rewards = mul_div(env, account.balance, delta, PRECISION)?;

    account
        .rewards
        .checked_add(new_rewards)
        .ok_or(ContractError::Overflow)
}

/// Checkpoint an account against an already-updated global state.
pub fn update_account(
    env: &Env,
    global: &GlobalState,
    account: AccountState,
) -> Result<AccountState, ContractError> {
    Ok(AccountState {
        rewards: earned(env, &account, global.reward_per_token_stored)?,
        reward_per_token_paid: global.reward_per_token_stored,
        ..account
    })
}

/// What the running window still has to emit after `now`; zero once it has
/// finished.
pub fn remaining_reward(state: &GlobalState, now: u64) -> Result<i128, ContractError> {
    if now >= state.finish_at {
        return Ok(0);
    }
    i128::from(state.finish_at - now)
        .checked_mul(state.reward_rate)
        .ok_or(ContractError::Overflow)
}

/// Rate for a window funded with `amount` at `now`.
///
/// If a window is still running, the part of its budget not yet emitted is
/// folded into the new one.
pub fn next_reward_rate(state: &GlobalState, amount: i128, now: u64) -> Result<i128, ContractError> {
    if state.duration == 0 {
        return Err(ContractError::InvalidDuration);
    }

    let budget = amount
        .checked_add(remaining_reward(state, now)?)
        .ok_or(ContractError::Overflow)?;

    let rate = budget / i128::from(state.duration);
    if rate <= 0 {
        return Err(ContractError::InvalidRate);
    }
    Ok(rate)
}

/// Start a fresh window at `now`.
///
/// `state` must already be advanced to `now` with [`update_global`].
/// `reward_balance` is what the ledger holds of the reward asset; the new
/// schedule may never promise more than that.
pub fn fund_window(
    state: GlobalState,
    amount: i128,
    now: u64,
    reward_balance: i128,
) -> Result<GlobalState, ContractError> {
    let reward_rate = next_reward_rate(&state, amount, now)?;

    let scheduled = reward_rate
        .checked_mul(i128::from(state.duration))
        .ok_or(ContractError::Overflow)?;
    if scheduled > reward_balance {
        return Err(ContractError::InsufficientRewardBalance);
    }

    // The old window's unemitted tail moves into `scheduled`.
    let reward_committed = state
        .reward_committed
        .checked_sub(remaining_reward(&state, now)?)
        .and_then(|c| c.checked_add(scheduled))
        .ok_or(ContractError::Overflow)?;

    let finish_at = now
        .checked_add(state.duration)
        .ok_or(ContractError::Overflow)?;

    Ok(GlobalState {
        reward_rate,
        last_update: now,
        finish_at,
        reward_committed,
        ..state
    })
}

/// Reward emitted over one full window at the current rate.
pub fn reward_for_duration(state: &GlobalState) -> Result<i128, ContractError> {
    state
        .reward_rate
        .checked_mul(i128::from(state.duration))
        .ok_or(ContractError::Overflow)
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    fn running(total_staked: i128, reward_rate: i128) -> GlobalState {
        GlobalState {
            total_staked,
            reward_rate,
            finish_at: 1_100,
            last_update: 1_000,
            reward_per_token_stored: 0,
            duration: 100,
            reward_committed: reward_rate * 100,
        }
    }

    #[test]
    fn rpt_unchanged_when_no_stakers() {
        let env = Env::default();
        let state = GlobalState {
            reward_per_token_stored: 500,
            ..running(0, 100)
        };
        assert_eq!(reward_per_token(&env, &state, 1_060), Ok(500));
        assert_eq!(reward_per_token(&env, &state, 9_999), Ok(500));
    }

    #[test]
    fn rpt_accumulates_correctly() {
        // 10/s over 100s shared by 1_000 staked units: one whole unit each.
        let env = Env::default();
        assert_eq!(
            reward_per_token(&env, &running(1_000, 10), 1_100),
            Ok(PRECISION)
        );
    }

    #[test]
    fn rpt_stops_at_window_end() {
        let env = Env::default();
        let state = running(1_000, 10);
        assert_eq!(
            reward_per_token(&env, &state, 1_100),
            reward_per_token(&env, &state, 5_000)
        );
    }

    #[test]
    fn rpt_frozen_before_first_funding() {
        let env = Env::default();
        let state = GlobalState {
            total_staked: 1_000,
            ..GlobalState::default()
        };
        assert_eq!(last_time_reward_applicable(state.finish_at, 50_000), 0);
        assert_eq!(reward_per_token(&env, &state, 50_000), Ok(0));
    }

    #[test]
    fn rpt_handles_eighteen_decimal_budgets() {
        // 1_000 tokens with 18 decimals over 100s on a 1_000 unit pool:
        // rate × elapsed × PRECISION is 10^39, past i128.
        let env = Env::default();
        let state = running(1_000, 10_000_000_000_000_000_000);
        assert_eq!(
            reward_per_token(&env, &state, 1_100),
            Ok(1_000_000_000_000_000_000_000_000_000_000_000_000)
        );
    }

    #[test]
    fn update_global_is_idempotent_at_same_time() {
        let env = Env::default();
        let once = update_global(&env, running(700, 13), 1_042).unwrap();
        let twice = update_global(&env, once.clone(), 1_042).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.last_update, 1_042);
    }

    #[test]
    fn update_global_advances_last_update_with_nobody_staked() {
        let env = Env::default();
        let next = update_global(&env, running(0, 10), 1_050).unwrap();
        assert_eq!(next.last_update, 1_050);
        assert_eq!(next.reward_per_token_stored, 0);
    }

    #[test]
    fn earned_keeps_prior_rewards_at_checkpoint() {
        let env = Env::default();
        let account = AccountState {
            balance: 40,
            reward_per_token_paid: 2 * PRECISION,
            rewards: 9,
        };
        assert_eq!(earned(&env, &account, 2 * PRECISION), Ok(9));
    }

    #[test]
    fn earned_truncates_partial_units() {
        // 3 staked × 0.5 per unit = 1.5, floored.
        let env = Env::default();
        let account = AccountState {
            balance: 3,
            ..AccountState::default()
        };
        assert_eq!(earned(&env, &account, PRECISION / 2), Ok(1));
    }

    #[test]
    fn earned_survives_wide_intermediate() {
        // balance × Δrpt is 10^51; only the 10^33 quotient must fit.
        let env = Env::default();
        let account = AccountState {
            balance: 1_000_000_000_000_000_000_000_000_000_000,
            ..AccountState::default()
        };
        assert_eq!(
            earned(&env, &account, 1_000 * PRECISION),
            Ok(1_000_000_000_000_000_000_000_000_000_000_000)
        );
    }

    #[test]
    fn earned_overflow_only_when_result_does_not_fit() {
        let env = Env::default();
        let account = AccountState {
            balance: i128::MAX / 2,
            ..AccountState::default()
        };
        assert_eq!(
            earned(&env, &account, 3 * PRECISION),
            Err(ContractError::Overflow)
        );
    }

    #[test]
    fn update_account_moves_checkpoint() {
        let env = Env::default();
        let global = GlobalState {
            reward_per_token_stored: 3 * PRECISION,
            ..running(100, 10)
        };
        let account = AccountState {
            balance: 10,
            reward_per_token_paid: PRECISION,
            rewards: 7,
        };
        let next = update_account(&env, &global, account).unwrap();
        assert_eq!(next.rewards, 27);
        assert_eq!(next.reward_per_token_paid, 3 * PRECISION);
        assert_eq!(next.balance, 10);
    }

    #[test]
    fn fresh_window_rate_truncates() {
        let state = GlobalState {
            duration: 604_800,
            ..GlobalState::default()
        };
        assert_eq!(next_reward_rate(&state, 1_000_000_000, 0), Ok(1_653));
    }

    #[test]
    fn zero_rate_is_rejected() {
        let state = GlobalState {
            duration: 100,
            ..GlobalState::default()
        };
        assert_eq!(
            next_reward_rate(&state, 99, 2_000),
            Err(ContractError::InvalidRate)
        );
    }

    #[test]
    fn active_window_folds_in_remainder() {
        // 60s left at 10/s = 600 remaining; (300 + 600) / 100 = 9
        let state = running(1, 10);
        assert_eq!(remaining_reward(&state, 1_040), Ok(600));
        assert_eq!(remaining_reward(&state, 1_100), Ok(0));
        assert_eq!(next_reward_rate(&state, 300, 1_040), Ok(9));
    }

    #[test]
    fn fund_window_checks_balance() {
        let state = GlobalState {
            duration: 100,
            ..GlobalState::default()
        };
        assert_eq!(
            fund_window(state.clone(), 1_000, 50, 999),
            Err(ContractError::InsufficientRewardBalance)
        );

        let funded = fund_window(state, 1_000, 50, 1_000).unwrap();
        assert_eq!(funded.reward_rate, 10);
        assert_eq!(funded.last_update, 50);
        assert_eq!(funded.finish_at, 150);
        assert_eq!(funded.reward_committed, 1_000);
        assert_eq!(reward_for_duration(&funded), Ok(1_000));
    }

    #[test]
    fn refunding_moves_unemitted_tail_into_commitment() {
        // 400 of the first 1_000 emitted; the 600 tail plus 300 new gives 900.
        let funded = fund_window(running(1, 10), 300, 1_040, 1_300).unwrap();
        assert_eq!(funded.reward_rate, 9);
        assert_eq!(funded.reward_committed, 1_000 - 600 + 900);
    }
}

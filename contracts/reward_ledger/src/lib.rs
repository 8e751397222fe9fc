#![no_std]

#[cfg(test)]
extern crate std;

pub mod events;
pub mod rewards;
pub mod storage;

use soroban_sdk::{contract, contractimpl, contracttype, log, token, Address, Env};

use rewards::{AccountState, GlobalState};
use storage::Config;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    InsufficientBalance = 5,
    WindowActive = 6,
    InvalidRate = 7,
    InsufficientRewardBalance = 8,
    TransferFailed = 9,
    InvalidDuration = 10,
    TokensIdentical = 11,
    Overflow = 12,
    Paused = 13,
    CannotRecoverStakeToken = 14,
    NoPendingController = 15,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Snapshot of a staker's position returned by `get_staker_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerInfo {
    pub staked: i128,
    pub pending_rewards: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct RewardLedgerContract;

#[contractimpl]
impl RewardLedgerContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the ledger.
    ///
    /// * `controller`   – the only address allowed to fund windows and
    ///                    change configuration.
    /// * `stake_token`  – SAC address of the token users stake.
    /// * `reward_token` – SAC address of the token paid out as rewards.
    /// * `duration`     – length in seconds of each funding window.
    pub fn initialize(
        env: Env,
        controller: Address,
        stake_token: Address,
        reward_token: Address,
        duration: u64,
    ) -> Result<(), ContractError> {
        if storage::has_config(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        if stake_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }
        if duration == 0 {
            return Err(ContractError::InvalidDuration);
        }

        storage::set_config(
            &env,
            &Config {
                controller: controller.clone(),
                stake_token: stake_token.clone(),
                reward_token: reward_token.clone(),
            },
        );
        // Timestamps, rate and accumulator all start at zero.
        storage::set_state(
            &env,
            &GlobalState {
                duration,
                ..GlobalState::default()
            },
        );
        storage::extend_instance_ttl(&env);

        events::publish_initialized(&env, controller, stake_token, reward_token, duration);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens.
    ///
    /// The staker is checkpointed first so the new deposit does not earn
    /// retroactively. State is written only after the token pull succeeds.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        let config = Self::require_config(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if storage::is_paused(&env) {
            return Err(ContractError::Paused);
        }

        let (mut global, mut account) = Self::checkpoint(&env, &staker)?;

        Self::transfer(
            &env,
            &config.stake_token,
            &staker,
            &env.current_contract_address(),
            amount,
        )?;

        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(ContractError::Overflow)?;
        global.total_staked = global
            .total_staked
            .checked_add(amount)
            .ok_or(ContractError::Overflow)?;

        storage::set_state(&env, &global);
        storage::set_account(&env, &staker, &account);
        storage::extend_instance_ttl(&env);

        events::publish_staked(&env, staker, amount, global.total_staked);

        Ok(())
    }

    /// Return `amount` staked tokens to the staker.
    pub fn withdraw(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        let config = Self::require_config(&env)?;
        staker.require_auth();

        Self::withdraw_stake(&env, &config, &staker, amount)
    }

    /// Pay out everything `staker` has accrued. Returns the amount paid,
    /// which is zero (and not an error) when nothing has accrued.
    pub fn claim(env: Env, staker: Address) -> Result<i128, ContractError> {
        let config = Self::require_config(&env)?;
        staker.require_auth();

        Self::pay_reward(&env, &config, &staker)
    }

    /// Withdraw the whole balance and claim, in one call.
    pub fn exit(env: Env, staker: Address) -> Result<i128, ContractError> {
        let config = Self::require_config(&env)?;
        staker.require_auth();

        let balance = storage::get_account(&env, &staker).balance;
        Self::withdraw_stake(&env, &config, &staker, balance)?;
        Self::pay_reward(&env, &config, &staker)
    }

    // ── Controller functions ────────────────────────────────────────────────

    /// Fund a reward window of `amount` starting now.
    ///
    /// A window that is still running has its unemitted remainder merged in,
    /// and the combined budget is spread over a fresh full-length window.
    /// The ledger must already hold enough reward tokens to cover the whole
    /// schedule.
    pub fn notify_reward_amount(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let config = Self::require_config(&env)?;
        caller.require_auth();
        Self::require_controller(&config, &caller)?;

        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        let global = rewards::update_global(&env, storage::get_state(&env), now)?;

        let reward_balance = token::Client::new(&env, &config.reward_token)
            .balance(&env.current_contract_address());
        let global = rewards::fund_window(global, amount, now, reward_balance)?;

        storage::set_state(&env, &global);
        storage::extend_instance_ttl(&env);

        log!(
            &env,
            "reward window funded",
            amount,
            global.reward_rate,
            global.finish_at
        );
        events::publish_reward_added(&env, amount, global.reward_rate, global.finish_at);

        Ok(())
    }

    /// Change the window length used by the next `notify_reward_amount`.
    /// Refused while a window is running.
    pub fn set_funding_window_duration(
        env: Env,
        caller: Address,
        duration: u64,
    ) -> Result<(), ContractError> {
        let config = Self::require_config(&env)?;
        caller.require_auth();
        Self::require_controller(&config, &caller)?;

        let mut global = storage::get_state(&env);
        if env.ledger().timestamp() < global.finish_at {
            return Err(ContractError::WindowActive);
        }
        if duration == 0 {
            return Err(ContractError::InvalidDuration);
        }

        global.duration = duration;
        storage::set_state(&env, &global);
        storage::extend_instance_ttl(&env);

        events::publish_duration_updated(&env, duration);

        Ok(())
    }

    /// Send a token that ended up on the ledger by mistake to `to`.
    /// The stake token can never be swept, and only the surplus of the
    /// reward token above what is still committed to stakers can be.
    pub fn recover_token(
        env: Env,
        caller: Address,
        token: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let config = Self::require_config(&env)?;
        caller.require_auth();
        Self::require_controller(&config, &caller)?;

        if token == config.stake_token {
            return Err(ContractError::CannotRecoverStakeToken);
        }
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if token == config.reward_token {
            let held = token::Client::new(&env, &token).balance(&env.current_contract_address());
            let surplus = held.saturating_sub(storage::get_state(&env).reward_committed);
            if amount > surplus {
                return Err(ContractError::InsufficientRewardBalance);
            }
        }

        Self::transfer(&env, &token, &env.current_contract_address(), &to, amount)?;
        storage::extend_instance_ttl(&env);

        events::publish_recovered(&env, token, to, amount);

        Ok(())
    }

    /// Block new stakes. Withdraw, claim and exit stay open.
    pub fn set_paused(env: Env, caller: Address, paused: bool) -> Result<(), ContractError> {
        let config = Self::require_config(&env)?;
        caller.require_auth();
        Self::require_controller(&config, &caller)?;

        storage::set_paused(&env, paused);
        storage::extend_instance_ttl(&env);

        events::publish_paused(&env, paused);

        Ok(())
    }

    // ── Controller transfer (two-step) ──────────────────────────────────────

    /// Propose a new controller. Takes effect once they call
    /// `accept_controller`.
    pub fn propose_controller(
        env: Env,
        caller: Address,
        new_controller: Address,
    ) -> Result<(), ContractError> {
        let config = Self::require_config(&env)?;
        caller.require_auth();
        Self::require_controller(&config, &caller)?;

        storage::set_pending_controller(&env, &new_controller);
        storage::extend_instance_ttl(&env);

        events::publish_controller_proposed(&env, caller, new_controller);

        Ok(())
    }

    pub fn accept_controller(env: Env, new_controller: Address) -> Result<(), ContractError> {
        let mut config = Self::require_config(&env)?;
        new_controller.require_auth();

        let pending =
            storage::get_pending_controller(&env).ok_or(ContractError::NoPendingController)?;
        if new_controller != pending {
            return Err(ContractError::Unauthorized);
        }

        let previous = config.controller.clone();
        config.controller = new_controller.clone();
        storage::set_config(&env, &config);
        storage::clear_pending_controller(&env);
        storage::extend_instance_ttl(&env);

        events::publish_controller_accepted(&env, previous, new_controller);

        Ok(())
    }

    pub fn cancel_controller_transfer(env: Env, caller: Address) -> Result<(), ContractError> {
        let config = Self::require_config(&env)?;
        caller.require_auth();
        Self::require_controller(&config, &caller)?;

        let pending =
            storage::get_pending_controller(&env).ok_or(ContractError::NoPendingController)?;
        storage::clear_pending_controller(&env);
        storage::extend_instance_ttl(&env);

        events::publish_controller_cancelled(&env, caller, pending);

        Ok(())
    }

    pub fn get_pending_controller(env: Env) -> Option<Address> {
        storage::get_pending_controller(&env)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn balance_of(env: Env, account: Address) -> i128 {
        storage::get_account(&env, &account).balance
    }

    pub fn total_staked(env: Env) -> i128 {
        storage::get_state(&env).total_staked
    }

    /// Real-time claimable rewards for `account`, without mutating state.
    pub fn earned(env: Env, account: Address) -> Result<i128, ContractError> {
        let rpt = rewards::reward_per_token(
            &env,
            &storage::get_state(&env),
            env.ledger().timestamp(),
        )?;
        rewards::earned(&env, &storage::get_account(&env, &account), rpt)
    }

    /// The accumulator as it would be if updated now.
    pub fn reward_per_token(env: Env) -> Result<i128, ContractError> {
        rewards::reward_per_token(&env, &storage::get_state(&env), env.ledger().timestamp())
    }

    pub fn last_time_reward_applicable(env: Env) -> u64 {
        rewards::last_time_reward_applicable(
            storage::get_state(&env).finish_at,
            env.ledger().timestamp(),
        )
    }

    pub fn reward_rate_per_second(env: Env) -> i128 {
        storage::get_state(&env).reward_rate
    }

    pub fn window_finish_time(env: Env) -> u64 {
        storage::get_state(&env).finish_at
    }

    pub fn last_update_time(env: Env) -> u64 {
        storage::get_state(&env).last_update
    }

    pub fn reward_per_token_stored(env: Env) -> i128 {
        storage::get_state(&env).reward_per_token_stored
    }

    pub fn funding_window_duration(env: Env) -> u64 {
        storage::get_state(&env).duration
    }

    /// Reward still owed to stakers or yet to be emitted by the running
    /// window. `recover_token` will not touch this part of the balance.
    pub fn reward_committed(env: Env) -> i128 {
        storage::get_state(&env).reward_committed
    }

    /// Total emitted over one window at the current rate.
    pub fn get_reward_for_duration(env: Env) -> Result<i128, ContractError> {
        rewards::reward_for_duration(&storage::get_state(&env))
    }

    /// Stored checkpoint for `account`, as of its last interaction.
    pub fn get_account(env: Env, account: Address) -> AccountState {
        storage::get_account(&env, &account)
    }

    pub fn get_staker_info(env: Env, staker: Address) -> Result<StakerInfo, ContractError> {
        let account = storage::get_account(&env, &staker);
        let rpt = rewards::reward_per_token(
            &env,
            &storage::get_state(&env),
            env.ledger().timestamp(),
        )?;

        Ok(StakerInfo {
            staked: account.balance,
            pending_rewards: rewards::earned(&env, &account, rpt)?,
        })
    }

    pub fn get_config(env: Env) -> Result<Config, ContractError> {
        Self::require_config(&env)
    }

    pub fn get_controller(env: Env) -> Result<Address, ContractError> {
        Ok(Self::require_config(&env)?.controller)
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::has_config(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if the contract is not yet initialized.
    fn require_config(env: &Env) -> Result<Config, ContractError> {
        storage::get_config(env).ok_or(ContractError::NotInitialized)
    }

    /// Guard: revert if `caller` is not the controller.
    fn require_controller(config: &Config, caller: &Address) -> Result<(), ContractError> {
        if *caller != config.controller {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Advance the global accumulator to now and checkpoint `account`
    /// against it. Nothing is written; callers persist the result after
    /// applying their own effect.
    fn checkpoint(
        env: &Env,
        account: &Address,
    ) -> Result<(GlobalState, AccountState), ContractError> {
        let global =
            rewards::update_global(env, storage::get_state(env), env.ledger().timestamp())?;
        let account = rewards::update_account(env, &global, storage::get_account(env, account))?;
        Ok((global, account))
    }

    fn withdraw_stake(
        env: &Env,
        config: &Config,
        staker: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let (mut global, mut account) = Self::checkpoint(env, staker)?;
        if amount > account.balance {
            return Err(ContractError::InsufficientBalance);
        }

        account.balance -= amount;
        global.total_staked = global
            .total_staked
            .checked_sub(amount)
            .ok_or(ContractError::Overflow)?;

        storage::set_state(env, &global);
        storage::set_account(env, staker, &account);
        storage::extend_instance_ttl(env);

        Self::transfer(
            env,
            &config.stake_token,
            &env.current_contract_address(),
            staker,
            amount,
        )?;

        events::publish_withdrawn(env, staker.clone(), amount, global.total_staked);

        Ok(())
    }

    fn pay_reward(env: &Env, config: &Config, staker: &Address) -> Result<i128, ContractError> {
        let (mut global, mut account) = Self::checkpoint(env, staker)?;

        let reward = account.rewards;
        if reward > 0 {
            account.rewards = 0;
            global.reward_committed = global.reward_committed.saturating_sub(reward).max(0);
        }

        storage::set_state(env, &global);
        storage::set_account(env, staker, &account);
        storage::extend_instance_ttl(env);

        if reward <= 0 {
            return Ok(0);
        }

        Self::transfer(
            env,
            &config.reward_token,
            &env.current_contract_address(),
            staker,
            reward,
        )?;

        events::publish_reward_paid(env, staker.clone(), reward);

        Ok(reward)
    }

    /// Move `amount` of `token`, turning a failed token call into
    /// `TransferFailed` so the whole invocation is rolled back.
    fn transfer(
        env: &Env,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        match token::Client::new(env, token).try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => {
                log!(env, "token transfer failed", token.clone(), amount);
                Err(ContractError::TransferFailed)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_properties;

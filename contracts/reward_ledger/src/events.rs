use soroban_sdk::{contracttype, symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub controller: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub duration: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub amount: i128,
    pub total_staked: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub staker: Address,
    pub amount: i128,
    pub total_staked: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPaidEvent {
    pub staker: Address,
    pub reward: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardAddedEvent {
    pub amount: i128,
    pub reward_rate: i128,
    pub finish_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DurationUpdatedEvent {
    pub duration: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecoveredEvent {
    pub token: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PausedEvent {
    pub paused: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControllerTransferEvent {
    pub current: Address,
    pub pending: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControllerChangedEvent {
    pub previous: Address,
    pub controller: Address,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    controller: Address,
    stake_token: Address,
    reward_token: Address,
    duration: u64,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            controller,
            stake_token,
            reward_token,
            duration,
        },
    );
}

pub fn publish_staked(env: &Env, staker: Address, amount: i128, total_staked: i128) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            amount,
            total_staked,
        },
    );
}

pub fn publish_withdrawn(env: &Env, staker: Address, amount: i128, total_staked: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), staker.clone()),
        WithdrawnEvent {
            staker,
            amount,
            total_staked,
        },
    );
}

pub fn publish_reward_paid(env: &Env, staker: Address, reward: i128) {
    env.events().publish(
        (symbol_short!("RWD_PAID"), staker.clone()),
        RewardPaidEvent { staker, reward },
    );
}

pub fn publish_reward_added(env: &Env, amount: i128, reward_rate: i128, finish_at: u64) {
    env.events().publish(
        (symbol_short!("RWD_ADDED"),),
        RewardAddedEvent {
            amount,
            reward_rate,
            finish_at,
        },
    );
}

pub fn publish_duration_updated(env: &Env, duration: u64) {
    env.events().publish(
        (symbol_short!("DUR_SET"),),
        DurationUpdatedEvent { duration },
    );
}

pub fn publish_recovered(env: &Env, token: Address, to: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RECOVERED"), token.clone()),
        RecoveredEvent { token, to, amount },
    );
}

pub fn publish_paused(env: &Env, paused: bool) {
    env.events()
        .publish((symbol_short!("PAUSED"),), PausedEvent { paused });
}

pub fn publish_controller_proposed(env: &Env, current: Address, pending: Address) {
    env.events().publish(
        (symbol_short!("CTL_PROP"),),
        ControllerTransferEvent { current, pending },
    );
}

pub fn publish_controller_accepted(env: &Env, previous: Address, controller: Address) {
    env.events().publish(
        (symbol_short!("CTL_ACC"),),
        ControllerChangedEvent {
            previous,
            controller,
        },
    );
}

pub fn publish_controller_cancelled(env: &Env, current: Address, pending: Address) {
    env.events().publish(
        (symbol_short!("CTL_CNL"),),
        ControllerTransferEvent { current, pending },
    );
}

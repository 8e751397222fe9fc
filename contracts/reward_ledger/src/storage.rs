use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::rewards::{AccountState, GlobalState};

// ── Storage key constants ───────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const STATE: Symbol = symbol_short!("STATE");
const PAUSED: Symbol = symbol_short!("PAUSED");
const PENDING_CONTROLLER: Symbol = symbol_short!("PEND_CTL");

// Per-account persistent storage uses tuple keys: (prefix, account)
const ACCOUNT: Symbol = symbol_short!("ACCT");

pub(crate) const INSTANCE_TTL_THRESHOLD: u32 = 5_184_000; // ~60 days
const INSTANCE_TTL_EXTEND_TO: u32 = 10_368_000; // ~120 days
const ACCOUNT_TTL_THRESHOLD: u32 = 5_184_000;
const ACCOUNT_TTL_EXTEND_TO: u32 = 10_368_000;

// ── Types ───────────────────────────────────────────────────────────────────

/// Fixed parameters written once by `initialize`.
///
/// `controller` is the only field that can change afterwards, through the
/// two-step handoff.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub controller: Address,
    pub stake_token: Address,
    pub reward_token: Address,
}

// ── Storage helpers ─────────────────────────────────────────────────────────

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
}

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&CONFIG)
}

pub fn get_config(env: &Env) -> Option<Config> {
    env.storage().instance().get(&CONFIG)
}

pub fn set_config(env: &Env, config: &Config) {
    env.storage().instance().set(&CONFIG, config);
}

/// Global accrual state; zeroed until `initialize` writes it.
pub fn get_state(env: &Env) -> GlobalState {
    env.storage().instance().get(&STATE).unwrap_or_default()
}

pub fn set_state(env: &Env, state: &GlobalState) {
    env.storage().instance().set(&STATE, state);
}

fn account_key(account: &Address) -> (Symbol, Address) {
    (ACCOUNT, account.clone())
}

/// Load an account's checkpoint. Accounts never seen before read as zero.
pub fn get_account(env: &Env, account: &Address) -> AccountState {
    env.storage()
        .persistent()
        .get(&account_key(account))
        .unwrap_or_default()
}

/// Persist an account's checkpoint and keep the entry alive.
pub fn set_account(env: &Env, account: &Address, state: &AccountState) {
    let key = account_key(account);
    env.storage().persistent().set(&key, state);
    env.storage()
        .persistent()
        .extend_ttl(&key, ACCOUNT_TTL_THRESHOLD, ACCOUNT_TTL_EXTEND_TO);
}

pub fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&PAUSED).unwrap_or(false)
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&PAUSED, &paused);
}

pub fn get_pending_controller(env: &Env) -> Option<Address> {
    env.storage().instance().get(&PENDING_CONTROLLER)
}

pub fn set_pending_controller(env: &Env, controller: &Address) {
    env.storage().instance().set(&PENDING_CONTROLLER, controller);
}

pub fn clear_pending_controller(env: &Env) {
    env.storage().instance().remove(&PENDING_CONTROLLER);
}

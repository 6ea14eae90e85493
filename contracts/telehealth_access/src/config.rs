use soroban_sdk::{contracttype, symbol_short, Env, Symbol};

use crate::{validation, ContractError};

const CONFIG: Symbol = symbol_short!("CONFIG");

/// Used when `initialize` is called with a zero duration.
pub const DEFAULT_GRANT_DURATION: u64 = 3600;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// How long an accepted grant stays effective.
    pub grant_duration_seconds: u64,
}

pub fn set(env: &Env, grant_duration_seconds: u64) -> Result<Config, ContractError> {
    validation::validate_grant_duration(grant_duration_seconds)?;
    let config = Config {
        grant_duration_seconds,
    };
    env.storage().instance().set(&CONFIG, &config);
    Ok(config)
}

pub fn get(env: &Env) -> Result<Config, ContractError> {
    env.storage()
        .instance()
        .get(&CONFIG)
        .ok_or(ContractError::NotInitialized)
}

pub fn grant_duration(env: &Env) -> Result<u64, ContractError> {
    Ok(get(env)?.grant_duration_seconds)
}

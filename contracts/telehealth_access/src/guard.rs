use soroban_sdk::{Address, Env};

use crate::{grant_store, ContractError};

/// True iff `requester` holds an accepted grant from `subject` that is
/// still unexpired at `now`. Never writes; expired grants are left as-is.
pub fn authorize(env: &Env, requester: &Address, subject: &Address, now: u64) -> bool {
    grant_store::find_effective_grant(env, requester, subject, now).is_some()
}

/// Gate for reads of `subject`'s data at the current ledger time.
///
/// The subject may always read their own data.
pub fn require_access(
    env: &Env,
    requester: &Address,
    subject: &Address,
) -> Result<(), ContractError> {
    if requester == subject || authorize(env, requester, subject, env.ledger().timestamp()) {
        Ok(())
    } else {
        Err(ContractError::AccessDenied)
    }
}

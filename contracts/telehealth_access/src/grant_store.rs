//! Persistent access-grant records.
//!
//! Records are never deleted. A (requester, subject) pair may own any number
//! of records, so nothing on the authorization path walks them: each pair
//! keeps one pointer to its latest-expiring accepted grant, and the subject
//! keeps a pending index that shrinks as requests are answered.

use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

use crate::{directory, pagination, AccessGrant, ContractError, GrantStatus};

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

const GRANT_COUNTER: Symbol = symbol_short!("GRT_CTR");

fn grant_key(id: u64) -> (Symbol, u64) {
    (symbol_short!("GRANT"), id)
}

fn effective_key(requester: &Address, subject: &Address) -> (Symbol, Address, Address) {
    (symbol_short!("EFFECT"), requester.clone(), subject.clone())
}

fn subject_key(subject: &Address) -> (Symbol, Address) {
    (symbol_short!("SUBJ_GRT"), subject.clone())
}

fn pending_key(subject: &Address) -> (Symbol, Address) {
    (symbol_short!("PENDING"), subject.clone())
}

fn save(env: &Env, grant: &AccessGrant) {
    let key = grant_key(grant.id);
    env.storage().persistent().set(&key, grant);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn load_index<K>(env: &Env, key: &K) -> Vec<u64>
where
    K: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage()
        .persistent()
        .get(key)
        .unwrap_or(Vec::new(env))
}

fn save_index<K>(env: &Env, key: &K, ids: &Vec<u64>)
where
    K: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, ids);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn append_index<K>(env: &Env, key: &K, id: u64)
where
    K: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    let mut ids = load_index(env, key);
    ids.push_back(id);
    save_index(env, key, &ids);
}

fn remove_from_index<K>(env: &Env, key: &K, id: u64)
where
    K: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    let mut ids = load_index(env, key);
    if let Some(pos) = ids.first_index_of(id) {
        ids.remove(pos);
        save_index(env, key, &ids);
    }
}

/// Points the pair at `grant` unless it already points at an accepted
/// grant that outlives it.
fn track_effective(env: &Env, grant: &AccessGrant) {
    let key = effective_key(&grant.requester, &grant.subject);
    let current = env
        .storage()
        .persistent()
        .get::<_, u64>(&key)
        .and_then(|id| get_grant(env, id));

    let outlived = current.is_some_and(|c| c.expires_at > grant.expires_at);
    if !outlived {
        env.storage().persistent().set(&key, &grant.id);
    }
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Inserts a new `Pending` grant for the pair.
///
/// Both parties must be registered principals.
pub fn create_grant(
    env: &Env,
    requester: &Address,
    subject: &Address,
) -> Result<AccessGrant, ContractError> {
    if !directory::is_registered(env, requester) || !directory::is_registered(env, subject) {
        return Err(ContractError::PrincipalNotFound);
    }

    let id: u64 = env
        .storage()
        .instance()
        .get(&GRANT_COUNTER)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&GRANT_COUNTER, &id);

    let grant = AccessGrant {
        id,
        requester: requester.clone(),
        subject: subject.clone(),
        status: GrantStatus::Pending,
        expires_at: None,
        created_at: env.ledger().timestamp(),
        responded_at: None,
    };

    save(env, &grant);
    append_index(env, &subject_key(subject), id);
    append_index(env, &pending_key(subject), id);

    Ok(grant)
}

pub fn get_grant(env: &Env, id: u64) -> Option<AccessGrant> {
    env.storage().persistent().get(&grant_key(id))
}

/// Resolves a pending grant.
///
/// The status check and the write run inside the same invocation, so a
/// second response to the same grant always sees the first one's result.
/// Accepting stamps `expires_at = now + duration_seconds`.
pub fn update_status(
    env: &Env,
    id: u64,
    new_status: GrantStatus,
    duration_seconds: u64,
) -> Result<AccessGrant, ContractError> {
    let mut grant = get_grant(env, id).ok_or(ContractError::GrantNotFound)?;

    if grant.status != GrantStatus::Pending || new_status == GrantStatus::Pending {
        return Err(ContractError::InvalidTransition);
    }

    let now = env.ledger().timestamp();
    if new_status == GrantStatus::Accepted {
        let expires_at = now
            .checked_add(duration_seconds)
            .ok_or(ContractError::InvalidInput)?;
        grant.expires_at = Some(expires_at);
    }
    grant.status = new_status;
    grant.responded_at = Some(now);

    save(env, &grant);
    remove_from_index(env, &pending_key(&grant.subject), id);
    if grant.status == GrantStatus::Accepted {
        track_effective(env, &grant);
    }

    Ok(grant)
}

/// An accepted grant for the pair whose expiry lies strictly after `as_of`.
///
/// Reads at most two entries however many records the pair has. When
/// several accepted grants overlap, the one expiring last is returned.
pub fn find_effective_grant(
    env: &Env,
    requester: &Address,
    subject: &Address,
    as_of: u64,
) -> Option<AccessGrant> {
    env.storage()
        .persistent()
        .get::<_, u64>(&effective_key(requester, subject))
        .and_then(|id| get_grant(env, id))
        .filter(|grant| grant.is_effective_at(as_of))
}

fn load_page(env: &Env, ids: &Vec<u64>, offset: u32, limit: u32) -> Vec<AccessGrant> {
    let mut grants = Vec::new(env);
    for id in pagination::newest_first(env, ids, offset, limit).iter() {
        if let Some(grant) = get_grant(env, id) {
            grants.push_back(grant);
        }
    }
    grants
}

/// One page of every grant naming `subject`, newest first.
pub fn grants_for_subject(
    env: &Env,
    subject: &Address,
    offset: u32,
    limit: u32,
) -> Vec<AccessGrant> {
    load_page(env, &load_index(env, &subject_key(subject)), offset, limit)
}

/// One page of the requests still awaiting the subject's answer, newest first.
pub fn pending_for_subject(
    env: &Env,
    subject: &Address,
    offset: u32,
    limit: u32,
) -> Vec<AccessGrant> {
    load_page(env, &load_index(env, &pending_key(subject)), offset, limit)
}

pub fn pending_count(env: &Env, subject: &Address) -> u32 {
    load_index(env, &pending_key(subject)).len()
}

pub fn grant_count(env: &Env) -> u64 {
    env.storage().instance().get(&GRANT_COUNTER).unwrap_or(0)
}

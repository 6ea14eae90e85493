//! Principal directory: who may take part in access requests, and how an
//! external patient code resolves to the patient's address.
//!
//! Resolution happens once, at the contract boundary. Everything behind it
//! works on `Address` values only.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};

use crate::{validation, ContractError, Role};

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// A registered doctor, patient or administrator.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Principal {
    pub address: Address,
    pub role: Role,
    pub name: String,
    /// External-facing code such as `PAT688885`; patients only.
    pub patient_code: Option<String>,
    pub registered_at: u64,
}

fn principal_key(address: &Address) -> (Symbol, Address) {
    (symbol_short!("PRIN"), address.clone())
}

fn code_key(code: &String) -> (Symbol, String) {
    (symbol_short!("PAT_CODE"), code.clone())
}

/// Stores (or overwrites) a principal.
///
/// A patient code may belong to one address only. Re-registering a patient
/// under a new code releases the old one.
pub fn register(
    env: &Env,
    address: Address,
    role: Role,
    name: String,
    patient_code: Option<String>,
) -> Result<Principal, ContractError> {
    validation::validate_name(&name)?;

    let patient_code = match (&role, patient_code) {
        (Role::Patient, Some(code)) => Some(validation::normalize_patient_code(env, &code)?),
        (Role::Patient, None) => return Err(ContractError::InvalidInput),
        (_, Some(_)) => return Err(ContractError::InvalidInput),
        (_, None) => None,
    };

    if let Some(code) = &patient_code {
        let owner: Option<Address> = env.storage().persistent().get(&code_key(code));
        if owner.is_some_and(|owner| owner != address) {
            return Err(ContractError::DuplicatePatientCode);
        }
    }

    if let Some(previous) = get_principal(env, &address) {
        if let Some(old_code) = previous.patient_code {
            if Some(&old_code) != patient_code.as_ref() {
                env.storage().persistent().remove(&code_key(&old_code));
            }
        }
    }

    let principal = Principal {
        address: address.clone(),
        role,
        name,
        patient_code: patient_code.clone(),
        registered_at: env.ledger().timestamp(),
    };

    let key = principal_key(&address);
    env.storage().persistent().set(&key, &principal);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    if let Some(code) = patient_code {
        let key = code_key(&code);
        env.storage().persistent().set(&key, &address);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    Ok(principal)
}

pub fn get_principal(env: &Env, address: &Address) -> Option<Principal> {
    env.storage().persistent().get(&principal_key(address))
}

pub fn is_registered(env: &Env, address: &Address) -> bool {
    env.storage().persistent().has(&principal_key(address))
}

/// Resolves an external patient code to the patient's address.
pub fn resolve_patient_code(env: &Env, code: &String) -> Result<Address, ContractError> {
    let code = validation::normalize_patient_code(env, code)?;
    env.storage()
        .persistent()
        .get(&code_key(&code))
        .ok_or(ContractError::PrincipalNotFound)
}

/// Display name used as the sender of notifications.
pub fn display_name(env: &Env, address: &Address) -> String {
    get_principal(env, address)
        .map(|p| p.name)
        .unwrap_or(String::from_str(env, "Unknown"))
}

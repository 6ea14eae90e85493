use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use crate::{pagination, validation, ContractError};

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

const REPORT_COUNTER: Symbol = symbol_short!("RPT_CTR");

/// Metadata for a report file held by an external store.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
    pub id: u64,
    pub patient: Address,
    pub report_type: String,
    pub url: String,
    pub filename: String,
    pub uploaded_by: Address,
    pub created_at: u64,
}

fn report_key(id: u64) -> (Symbol, u64) {
    (symbol_short!("REPORT"), id)
}

fn patient_key(patient: &Address) -> (Symbol, Address) {
    (symbol_short!("PAT_RPT"), patient.clone())
}

pub fn add(
    env: &Env,
    patient: &Address,
    uploaded_by: &Address,
    report_type: String,
    url: String,
    filename: String,
) -> Result<Report, ContractError> {
    validation::validate_text(&report_type)?;
    validation::validate_text(&url)?;
    validation::validate_text(&filename)?;

    let id: u64 = env
        .storage()
        .instance()
        .get(&REPORT_COUNTER)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&REPORT_COUNTER, &id);

    let report = Report {
        id,
        patient: patient.clone(),
        report_type,
        url,
        filename,
        uploaded_by: uploaded_by.clone(),
        created_at: env.ledger().timestamp(),
    };

    let key = report_key(id);
    env.storage().persistent().set(&key, &report);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    let list_key = patient_key(patient);
    let mut ids: Vec<u64> = env
        .storage()
        .persistent()
        .get(&list_key)
        .unwrap_or(Vec::new(env));
    ids.push_back(id);
    env.storage().persistent().set(&list_key, &ids);
    env.storage()
        .persistent()
        .extend_ttl(&list_key, TTL_THRESHOLD, TTL_EXTEND_TO);

    Ok(report)
}

pub fn get(env: &Env, id: u64) -> Option<Report> {
    env.storage().persistent().get(&report_key(id))
}

fn load_index(env: &Env, patient: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&patient_key(patient))
        .unwrap_or(Vec::new(env))
}

/// One page of `patient`'s reports, newest first.
pub fn for_patient(env: &Env, patient: &Address, offset: u32, limit: u32) -> Vec<Report> {
    let ids = load_index(env, patient);

    let mut out = Vec::new(env);
    for id in pagination::newest_first(env, &ids, offset, limit).iter() {
        if let Some(report) = get(env, id) {
            out.push_back(report);
        }
    }
    out
}

/// Removes the report record and its entry in the patient's index.
pub fn remove(env: &Env, report: &Report) {
    let list_key = patient_key(&report.patient);
    let mut ids = load_index(env, &report.patient);
    if let Some(pos) = ids.first_index_of(report.id) {
        ids.remove(pos);
        env.storage().persistent().set(&list_key, &ids);
        env.storage()
            .persistent()
            .extend_ttl(&list_key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    env.storage().persistent().remove(&report_key(report.id));
}

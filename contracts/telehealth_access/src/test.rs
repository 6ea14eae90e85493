#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use super::*;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::Env;

struct Setup {
    env: Env,
    client: TelehealthAccessContractClient<'static>,
    admin: Address,
}

fn setup(grant_duration: u64) -> Setup {
    let env = Env::default();
    env.mock_all_auths();

    let contract_id = env.register(TelehealthAccessContract, ());
    let client = TelehealthAccessContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(&admin, &grant_duration);

    Setup { env, client, admin }
}

fn doctor(s: &Setup, name: &str) -> Address {
    let doctor = Address::generate(&s.env);
    s.client
        .register_doctor(&s.admin, &doctor, &String::from_str(&s.env, name));
    doctor
}

fn patient(s: &Setup, code: &str, name: &str) -> Address {
    let patient = Address::generate(&s.env);
    s.client.register_patient(
        &s.admin,
        &patient,
        &String::from_str(&s.env, code),
        &String::from_str(&s.env, name),
    );
    patient
}

fn decision(env: &Env, d: &str) -> String {
    String::from_str(env, d)
}

#[test]
fn test_initialize() {
    let s = setup(3600);

    assert!(s.client.is_initialized());
    assert_eq!(s.client.get_admin(), s.admin);
    assert_eq!(s.client.get_config().grant_duration_seconds, 3600);
    assert_eq!(s.client.get_principal(&s.admin).role, Role::Admin);
}

#[test]
fn test_initialize_zero_duration_uses_default() {
    let s = setup(0);
    assert_eq!(
        s.client.get_config().grant_duration_seconds,
        config::DEFAULT_GRANT_DURATION
    );
}

#[test]
fn test_double_initialize_fails() {
    let s = setup(3600);
    let other = Address::generate(&s.env);
    let result = s.client.try_initialize(&other, &3600);
    assert_eq!(result, Err(Ok(ContractError::AlreadyInitialized)));
}

#[test]
fn test_initialize_rejects_out_of_range_duration() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(TelehealthAccessContract, ());
    let client = TelehealthAccessContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    let result = client.try_initialize(&admin, &10);
    assert_eq!(result, Err(Ok(ContractError::InvalidDuration)));
    assert!(!client.is_initialized());
}

#[test]
fn test_request_requires_initialization() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(TelehealthAccessContract, ());
    let client = TelehealthAccessContractClient::new(&env, &contract_id);

    let doctor = Address::generate(&env);
    let result = client.try_request_access(&doctor, &String::from_str(&env, "PAT001"));
    assert_eq!(result, Err(Ok(ContractError::NotInitialized)));
}

#[test]
fn test_rejected_request_never_authorizes() {
    let s = setup(3600);
    let d1 = doctor(&s, "Dr. One");
    let p1 = patient(&s, "PAT001", "Patient One");

    let grant = s
        .client
        .request_access(&d1, &String::from_str(&s.env, "PAT001"));
    assert_eq!(grant.status, GrantStatus::Pending);
    assert_eq!(grant.requester, d1);
    assert_eq!(grant.subject, p1);
    assert_eq!(grant.expires_at, None);

    let rejected = s
        .client
        .respond_to_access(&grant.id, &p1, &decision(&s.env, "rejected"));
    assert_eq!(rejected.status, GrantStatus::Rejected);
    assert_eq!(rejected.expires_at, None);
    assert!(!s.client.authorize(&d1, &p1));

    let again = s
        .client
        .try_respond_to_access(&grant.id, &p1, &decision(&s.env, "accepted"));
    assert_eq!(again, Err(Ok(ContractError::InvalidTransition)));
    assert_eq!(s.client.get_grant(&grant.id).status, GrantStatus::Rejected);
}

#[test]
fn test_accepted_grant_expires_after_duration() {
    let s = setup(60);
    let d2 = doctor(&s, "Dr. Two");
    let p2 = patient(&s, "PAT002", "Patient Two");

    let start = s.env.ledger().timestamp();
    let grant = s
        .client
        .request_access(&d2, &String::from_str(&s.env, "PAT002"));
    let accepted = s
        .client
        .respond_to_access(&grant.id, &p2, &decision(&s.env, "accepted"));
    assert_eq!(accepted.expires_at, Some(start + 60));

    assert!(s.client.authorize(&d2, &p2));

    s.env.ledger().set_timestamp(start + 61);
    assert!(!s.client.authorize(&d2, &p2));
    // Expiry is passive: the stored record is untouched.
    assert_eq!(s.client.get_grant(&grant.id).status, GrantStatus::Accepted);
}

#[test]
fn test_expiry_boundary_is_exclusive() {
    let s = setup(60);
    let d = doctor(&s, "Dr. Edge");
    let p = patient(&s, "PAT010", "Patient Edge");

    let grant = s
        .client
        .request_access(&d, &String::from_str(&s.env, "PAT010"));
    s.client
        .respond_to_access(&grant.id, &p, &decision(&s.env, "accepted"));

    s.env.ledger().set_timestamp(59);
    assert!(s.client.authorize(&d, &p));
    s.env.ledger().set_timestamp(60);
    assert!(!s.client.authorize(&d, &p));
}

#[test]
fn test_only_subject_may_respond() {
    let s = setup(3600);
    let d = doctor(&s, "Dr. Four");
    let p3 = patient(&s, "PAT003", "Patient Three");
    let p4 = patient(&s, "PAT004", "Patient Four");

    let grant = s
        .client
        .request_access(&d, &String::from_str(&s.env, "PAT004"));

    let result = s
        .client
        .try_respond_to_access(&grant.id, &p3, &decision(&s.env, "accepted"));
    assert_eq!(result, Err(Ok(ContractError::AccessDenied)));
    assert_eq!(s.client.get_grant(&grant.id).status, GrantStatus::Pending);
    assert!(!s.client.authorize(&d, &p4));
}

#[test]
fn test_invalid_decision_leaves_grant_pending() {
    let s = setup(3600);
    let d = doctor(&s, "Dr. Five");
    let p = patient(&s, "PAT005", "Patient Five");

    let grant = s
        .client
        .request_access(&d, &String::from_str(&s.env, "PAT005"));
    let result = s
        .client
        .try_respond_to_access(&grant.id, &p, &decision(&s.env, "maybe"));
    assert_eq!(result, Err(Ok(ContractError::InvalidDecision)));
    assert_eq!(s.client.get_grant(&grant.id).status, GrantStatus::Pending);
}

#[test]
fn test_unknown_grant_is_not_found() {
    let s = setup(3600);
    let p = patient(&s, "PAT006", "Patient Six");
    let result = s
        .client
        .try_respond_to_access(&42, &p, &decision(&s.env, "accepted"));
    assert_eq!(result, Err(Ok(ContractError::GrantNotFound)));
}

#[test]
fn test_unknown_patient_code_is_not_found() {
    let s = setup(3600);
    let d = doctor(&s, "Dr. Seven");
    let result = s
        .client
        .try_request_access(&d, &String::from_str(&s.env, "PAT999"));
    assert_eq!(result, Err(Ok(ContractError::PrincipalNotFound)));
    assert_eq!(s.client.get_grant_count(), 0);
}

#[test]
fn test_unregistered_requester_is_not_found() {
    let s = setup(3600);
    patient(&s, "PAT007", "Patient Seven");
    let stranger = Address::generate(&s.env);
    let result = s
        .client
        .try_request_access(&stranger, &String::from_str(&s.env, "PAT007"));
    assert_eq!(result, Err(Ok(ContractError::PrincipalNotFound)));
}

#[test]
fn test_patient_code_is_trimmed_on_lookup() {
    let s = setup(3600);
    let d = doctor(&s, "Dr. Eight");
    let p = patient(&s, "PAT688885", "Patient Eight");

    let grant = s
        .client
        .request_access(&d, &String::from_str(&s.env, "  PAT688885 "));
    assert_eq!(grant.subject, p);
}

#[test]
fn test_set_grant_duration_applies_to_new_acceptances() {
    let s = setup(3600);
    let d = doctor(&s, "Dr. Nine");
    let p = patient(&s, "PAT009", "Patient Nine");
    let code = String::from_str(&s.env, "PAT009");

    let first = s.client.request_access(&d, &code);
    s.client
        .respond_to_access(&first.id, &p, &decision(&s.env, "accepted"));

    s.client.set_grant_duration(&s.admin, &120);
    let second = s.client.request_access(&d, &code);
    let accepted = s
        .client
        .respond_to_access(&second.id, &p, &decision(&s.env, "accepted"));

    assert_eq!(s.client.get_grant(&first.id).expires_at, Some(3600));
    assert_eq!(accepted.expires_at, Some(120));
}

#[test]
fn test_set_grant_duration_requires_admin() {
    let s = setup(3600);
    let d = doctor(&s, "Dr. Ten");
    let result = s.client.try_set_grant_duration(&d, &120);
    assert_eq!(result, Err(Ok(ContractError::Unauthorized)));
}

#[test]
fn test_registration_requires_admin() {
    let s = setup(3600);
    let d = doctor(&s, "Dr. Eleven");
    let newcomer = Address::generate(&s.env);
    let result = s.client.try_register_patient(
        &d,
        &newcomer,
        &String::from_str(&s.env, "PAT011"),
        &String::from_str(&s.env, "Patient Eleven"),
    );
    assert_eq!(result, Err(Ok(ContractError::Unauthorized)));
}

#[test]
fn test_duplicate_patient_code_rejected() {
    let s = setup(3600);
    patient(&s, "PAT012", "Patient Twelve");
    let other = Address::generate(&s.env);
    let result = s.client.try_register_patient(
        &s.admin,
        &other,
        &String::from_str(&s.env, "PAT012"),
        &String::from_str(&s.env, "Someone Else"),
    );
    assert_eq!(result, Err(Ok(ContractError::DuplicatePatientCode)));
}

#[test]
fn test_reregistering_patient_releases_old_code() {
    let s = setup(3600);
    let p = patient(&s, "PAT013", "Patient Thirteen");
    s.client.register_patient(
        &s.admin,
        &p,
        &String::from_str(&s.env, "PAT113"),
        &String::from_str(&s.env, "Patient Thirteen"),
    );

    assert_eq!(
        s.client.resolve_patient(&String::from_str(&s.env, "PAT113")),
        p
    );
    assert_eq!(
        s.client
            .try_resolve_patient(&String::from_str(&s.env, "PAT013")),
        Err(Ok(ContractError::PrincipalNotFound))
    );
}

#[test]
fn test_version() {
    assert_eq!(TelehealthAccessContract::version(), 1);
}

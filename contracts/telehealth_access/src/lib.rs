#![no_std]
pub mod config;
pub mod directory;
pub mod errors;
pub mod events;
pub mod grant_store;
pub mod guard;
pub mod lifecycle;
pub mod notifications;
pub mod pagination;
pub mod reports;
pub mod validation;

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, Address, Env, String, Symbol, Vec,
};

pub use config::Config;
pub use directory::Principal;
pub use errors::{
    create_error_context, log_error, ContractError, ErrorCategory, ErrorLogEntry, ErrorSeverity,
};
pub use notifications::{InboxEntry, Notification, NotificationKind};
pub use reports::Report;

/// Storage keys for the contract
const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");

/// Directory roles
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Admin,
    Doctor,
    Patient,
}

/// Lifecycle status of an access request
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GrantStatus {
    /// Awaiting the patient's answer
    Pending,
    /// Patient agreed; effective until `expires_at`
    Accepted,
    /// Patient declined; terminal
    Rejected,
}

/// One doctor's request for, and possibly permission to, a patient's data
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessGrant {
    pub id: u64,
    pub requester: Address,
    pub subject: Address,
    pub status: GrantStatus,
    /// Set only when the request is accepted
    pub expires_at: Option<u64>,
    pub created_at: u64,
    pub responded_at: Option<u64>,
}

impl AccessGrant {
    /// Accepted and not yet expired at `now`.
    pub fn is_effective_at(&self, now: u64) -> bool {
        self.status == GrantStatus::Accepted && self.expires_at.is_some_and(|exp| exp > now)
    }
}

#[contract]
pub struct TelehealthAccessContract;

#[contractimpl]
impl TelehealthAccessContract {
    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let admin = Self::get_admin(env.clone())?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Initialize the contract with an admin address and the grant duration.
    /// A zero duration selects the default of one hour.
    pub fn initialize(
        env: Env,
        admin: Address,
        grant_duration_seconds: u64,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }

        let duration = if grant_duration_seconds == 0 {
            config::DEFAULT_GRANT_DURATION
        } else {
            grant_duration_seconds
        };
        config::set(&env, duration)?;

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);

        directory::register(
            &env,
            admin.clone(),
            Role::Admin,
            String::from_str(&env, "Administrator"),
            None,
        )?;

        events::publish_initialized(&env, admin, duration);

        Ok(())
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_config(env: Env) -> Result<Config, ContractError> {
        config::get(&env)
    }

    /// Change how long newly accepted grants last. Existing grants keep their expiry.
    pub fn set_grant_duration(
        env: Env,
        caller: Address,
        grant_duration_seconds: u64,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        config::set(&env, grant_duration_seconds)?;
        events::publish_config_updated(&env, caller, grant_duration_seconds);

        Ok(())
    }

    // ======================== Directory ========================

    pub fn register_doctor(
        env: Env,
        caller: Address,
        doctor: Address,
        name: String,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        directory::register(&env, doctor.clone(), Role::Doctor, name.clone(), None)?;
        events::publish_principal_registered(&env, doctor, Role::Doctor, name);

        Ok(())
    }

    pub fn register_patient(
        env: Env,
        caller: Address,
        patient: Address,
        patient_code: String,
        name: String,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        directory::register(
            &env,
            patient.clone(),
            Role::Patient,
            name.clone(),
            Some(patient_code),
        )?;
        events::publish_principal_registered(&env, patient, Role::Patient, name);

        Ok(())
    }

    pub fn get_principal(env: Env, address: Address) -> Result<Principal, ContractError> {
        directory::get_principal(&env, &address).ok_or(ContractError::PrincipalNotFound)
    }

    pub fn resolve_patient(env: Env, patient_code: String) -> Result<Address, ContractError> {
        directory::resolve_patient_code(&env, &patient_code)
    }

    // ======================== Access lifecycle ========================

    /// Doctor asks the patient identified by `patient_code` for access.
    pub fn request_access(
        env: Env,
        requester: Address,
        patient_code: String,
    ) -> Result<AccessGrant, ContractError> {
        requester.require_auth();
        Self::require_initialized(&env)?;

        lifecycle::request_access(&env, &requester, &patient_code)
    }

    /// Patient answers a pending request with `"accepted"` or `"rejected"`.
    pub fn respond_to_access(
        env: Env,
        grant_id: u64,
        responder: Address,
        decision: String,
    ) -> Result<AccessGrant, ContractError> {
        responder.require_auth();

        lifecycle::respond_to_access(&env, grant_id, &responder, &decision)
    }

    pub fn get_grant(env: Env, grant_id: u64) -> Result<AccessGrant, ContractError> {
        grant_store::get_grant(&env, grant_id).ok_or(ContractError::GrantNotFound)
    }

    /// Unanswered requests for `patient`, newest first. At most
    /// `pagination::MAX_PAGE_SIZE` per call.
    pub fn get_pending_requests(
        env: Env,
        patient: Address,
        offset: u32,
        limit: u32,
    ) -> Vec<AccessGrant> {
        grant_store::pending_for_subject(&env, &patient, offset, limit)
    }

    pub fn get_pending_count(env: Env, patient: Address) -> u32 {
        grant_store::pending_count(&env, &patient)
    }

    /// Every request ever made for `patient`, newest first, one page at a time.
    pub fn get_subject_grants(
        env: Env,
        patient: Address,
        offset: u32,
        limit: u32,
    ) -> Vec<AccessGrant> {
        grant_store::grants_for_subject(&env, &patient, offset, limit)
    }

    pub fn get_grant_count(env: Env) -> u64 {
        grant_store::grant_count(&env)
    }

    // ======================== Access guard ========================

    /// Whether `requester` currently holds an effective grant from `patient`.
    pub fn authorize(env: Env, requester: Address, patient: Address) -> bool {
        guard::authorize(&env, &requester, &patient, env.ledger().timestamp())
    }

    /// Caller-side "can I access this patient?" check by external code.
    pub fn check_access(
        env: Env,
        requester: Address,
        patient_code: String,
    ) -> Result<bool, ContractError> {
        let patient = directory::resolve_patient_code(&env, &patient_code)?;
        Ok(guard::authorize(
            &env,
            &requester,
            &patient,
            env.ledger().timestamp(),
        ))
    }

    pub fn get_effective_grant(
        env: Env,
        requester: Address,
        patient: Address,
    ) -> Option<AccessGrant> {
        grant_store::find_effective_grant(&env, &requester, &patient, env.ledger().timestamp())
    }

    // ======================== Notifications ========================

    /// Recipient's notifications, newest first.
    pub fn get_notifications(env: Env, recipient: Address) -> Vec<Notification> {
        recipient.require_auth();
        notifications::list_for(&env, &recipient)
    }

    pub fn get_unread_count(env: Env, recipient: Address) -> u32 {
        recipient.require_auth();
        notifications::unread_count(&env, &recipient)
    }

    pub fn mark_notification_read(
        env: Env,
        caller: Address,
        notification_id: u64,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        notifications::mark_read(&env, &caller, notification_id)
    }

    pub fn delete_notification(
        env: Env,
        caller: Address,
        notification_id: u64,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        notifications::delete(&env, &caller, notification_id)
    }

    // ======================== Reports ========================

    /// Attach report metadata to a patient. The caller must be the patient
    /// or hold an effective grant from them.
    pub fn add_report(
        env: Env,
        caller: Address,
        patient_code: String,
        report_type: String,
        url: String,
        filename: String,
    ) -> Result<u64, ContractError> {
        caller.require_auth();

        let patient = directory::resolve_patient_code(&env, &patient_code)?;
        guard::require_access(&env, &caller, &patient)?;

        let report = reports::add(&env, &patient, &caller, report_type, url, filename)?;
        events::publish_report_added(&env, report.id, patient, caller);

        Ok(report.id)
    }

    pub fn get_patient_reports(
        env: Env,
        caller: Address,
        patient_code: String,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Report>, ContractError> {
        caller.require_auth();

        let patient = directory::resolve_patient_code(&env, &patient_code)?;
        guard::require_access(&env, &caller, &patient)?;

        Ok(reports::for_patient(&env, &patient, offset, limit))
    }

    pub fn get_report(env: Env, caller: Address, report_id: u64) -> Result<Report, ContractError> {
        caller.require_auth();

        let report = reports::get(&env, report_id).ok_or(ContractError::ReportNotFound)?;
        guard::require_access(&env, &caller, &report.patient)?;

        Ok(report)
    }

    /// Remove a report. The patient may remove any of theirs; an uploader
    /// may remove their own upload while still holding access.
    pub fn delete_report(env: Env, caller: Address, report_id: u64) -> Result<(), ContractError> {
        caller.require_auth();

        let report = reports::get(&env, report_id).ok_or(ContractError::ReportNotFound)?;
        if caller != report.patient {
            if caller != report.uploaded_by {
                return Err(ContractError::AccessDenied);
            }
            guard::require_access(&env, &caller, &report.patient)?;
        }

        reports::remove(&env, &report);
        events::publish_report_deleted(&env, report_id, report.patient, caller);

        Ok(())
    }

    // ======================== Error log ========================

    pub fn get_error_log(env: Env) -> Vec<ErrorLogEntry> {
        errors::get_error_log(&env)
    }

    pub fn get_error_count(env: Env) -> u64 {
        errors::get_error_count(&env)
    }

    pub fn clear_error_log(env: Env, caller: Address) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_admin(&env, &caller)?;
        errors::clear_error_log(&env);
        Ok(())
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }
}

#[cfg(test)]
mod test;

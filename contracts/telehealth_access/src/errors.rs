#![allow(clippy::arithmetic_side_effects)]
use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

pub const ERROR_LOG_KEY: Symbol = symbol_short!("ERR_LOG");
pub const ERROR_COUNT_KEY: Symbol = symbol_short!("ERR_CNT");
pub const MAX_ERROR_LOG_SIZE: u32 = 100;

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

fn extend_ttl_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Error categories used to classify failures for callers and monitoring.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Malformed input: bad decision strings, empty codes, out-of-range durations
    Validation = 1,
    /// The caller is not the party allowed to perform the action
    Authorization = 2,
    /// A referenced principal, grant, notification or report does not exist
    NotFound = 3,
    /// The action conflicts with stored state (already responded, duplicate code)
    StateConflict = 4,
    /// Delivery of an advisory side effect failed
    Delivery = 5,
    /// Contract lifecycle problems
    System = 6,
}

/// Error severity levels indicating the impact and urgency of errors
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorSeverity {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ErrorContext {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub message: String,
    pub user: Option<Address>,
    pub resource_id: Option<String>,
    pub timestamp: u64,
    pub retryable: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ErrorLogEntry {
    pub error_code: u32,
    pub context: ErrorContext,
}

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    PrincipalNotFound = 4,
    GrantNotFound = 5,
    InvalidInput = 6,
    AccessDenied = 7,
    InvalidDecision = 8,
    InvalidTransition = 9,
    InvalidDuration = 10,
    DuplicatePatientCode = 11,
    NotificationNotFound = 12,
    ReportNotFound = 13,
    SenderQuotaExceeded = 14,
}

impl ContractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::InvalidInput
            | ContractError::InvalidDecision
            | ContractError::InvalidDuration => ErrorCategory::Validation,
            ContractError::Unauthorized | ContractError::AccessDenied => {
                ErrorCategory::Authorization
            }
            ContractError::PrincipalNotFound
            | ContractError::GrantNotFound
            | ContractError::NotificationNotFound
            | ContractError::ReportNotFound => ErrorCategory::NotFound,
            ContractError::InvalidTransition | ContractError::DuplicatePatientCode => {
                ErrorCategory::StateConflict
            }
            ContractError::SenderQuotaExceeded => ErrorCategory::Delivery,
            ContractError::NotInitialized | ContractError::AlreadyInitialized => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ContractError::InvalidInput
            | ContractError::InvalidDecision
            | ContractError::InvalidDuration
            | ContractError::PrincipalNotFound
            | ContractError::GrantNotFound
            | ContractError::NotificationNotFound
            | ContractError::ReportNotFound
            | ContractError::InvalidTransition
            | ContractError::DuplicatePatientCode
            | ContractError::AlreadyInitialized => ErrorSeverity::Low,
            ContractError::Unauthorized
            | ContractError::AccessDenied
            | ContractError::SenderQuotaExceeded => ErrorSeverity::Medium,
            ContractError::NotInitialized => ErrorSeverity::Critical,
        }
    }

    /// Only notification delivery can succeed later without the caller changing anything.
    pub fn retryable(&self) -> bool {
        matches!(self, ContractError::SenderQuotaExceeded)
    }

    pub fn message(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "Contract has not been initialized",
            ContractError::AlreadyInitialized => "Contract is already initialized",
            ContractError::Unauthorized => "Caller is not authorized for this operation",
            ContractError::PrincipalNotFound => "Principal not found in the directory",
            ContractError::GrantNotFound => "Access request not found",
            ContractError::InvalidInput => "Invalid input parameters provided",
            ContractError::AccessDenied => "Access not granted or expired",
            ContractError::InvalidDecision => "Decision must be accepted or rejected",
            ContractError::InvalidTransition => "Access request has already been responded to",
            ContractError::InvalidDuration => "Grant duration is out of range",
            ContractError::DuplicatePatientCode => "Patient code is already registered",
            ContractError::NotificationNotFound => "Notification not found",
            ContractError::ReportNotFound => "Report not found",
            ContractError::SenderQuotaExceeded => {
                "Sender holds too many unread requests in this inbox"
            }
        }
    }
}

/// Appends an entry to the bounded error log and bumps the total error count.
///
/// Only entries written during an invocation that ultimately succeeds are
/// kept: the host discards every storage write of a failed invocation.
pub fn log_error(
    env: &Env,
    error: ContractError,
    user: Option<Address>,
    resource_id: Option<String>,
) {
    let log_entry = ErrorLogEntry {
        error_code: error as u32,
        context: create_error_context(env, error, user, resource_id),
    };

    let mut error_log: Vec<ErrorLogEntry> = env
        .storage()
        .instance()
        .get(&ERROR_LOG_KEY)
        .unwrap_or(Vec::new(env));

    error_log.push_back(log_entry);

    if error_log.len() > MAX_ERROR_LOG_SIZE {
        error_log.pop_front();
    }

    env.storage().instance().set(&ERROR_LOG_KEY, &error_log);

    let error_count: u64 = env.storage().instance().get(&ERROR_COUNT_KEY).unwrap_or(0);
    env.storage()
        .instance()
        .set(&ERROR_COUNT_KEY, &(error_count + 1));

    extend_ttl_instance(env);
}

pub fn get_error_log(env: &Env) -> Vec<ErrorLogEntry> {
    env.storage()
        .instance()
        .get(&ERROR_LOG_KEY)
        .unwrap_or(Vec::new(env))
}

/// Total number of logged errors; survives log truncation.
pub fn get_error_count(env: &Env) -> u64 {
    env.storage().instance().get(&ERROR_COUNT_KEY).unwrap_or(0)
}

pub fn clear_error_log(env: &Env) {
    env.storage().instance().remove(&ERROR_LOG_KEY);
    env.storage().instance().set(&ERROR_COUNT_KEY, &0u64);
    extend_ttl_instance(env);
}

pub fn create_error_context(
    env: &Env,
    error: ContractError,
    user: Option<Address>,
    resource_id: Option<String>,
) -> ErrorContext {
    ErrorContext {
        category: error.category(),
        severity: error.severity(),
        message: String::from_str(env, error.message()),
        user,
        resource_id,
        timestamp: env.ledger().timestamp(),
        retryable: error.retryable(),
    }
}

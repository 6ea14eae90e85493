use crate::errors::ErrorContext;
use crate::{GrantStatus, NotificationKind, Role};
use soroban_sdk::{symbol_short, Address, Env, String};

/// Event published when the contract is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub grant_duration_seconds: u64,
    pub timestamp: u64,
}

/// Event published when the admin changes the grant duration.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigUpdatedEvent {
    pub admin: Address,
    pub grant_duration_seconds: u64,
    pub timestamp: u64,
}

/// Event published when a doctor or patient joins the directory.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrincipalRegisteredEvent {
    pub principal: Address,
    pub role: Role,
    pub name: String,
    pub timestamp: u64,
}

/// Event published when a doctor asks a patient for access.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessRequestedEvent {
    pub grant_id: u64,
    pub requester: Address,
    pub subject: Address,
    pub timestamp: u64,
}

/// Event published when a patient accepts or rejects a request.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessRespondedEvent {
    pub grant_id: u64,
    pub requester: Address,
    pub subject: Address,
    pub status: GrantStatus,
    pub expires_at: Option<u64>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotificationSentEvent {
    pub notification_id: u64,
    pub recipient: Address,
    pub kind: NotificationKind,
    pub related_grant: Option<u64>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotificationsReadEvent {
    pub recipient: Address,
    pub count: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportAddedEvent {
    pub report_id: u64,
    pub patient: Address,
    pub uploaded_by: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportDeletedEvent {
    pub report_id: u64,
    pub patient: Address,
    pub deleted_by: Address,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, admin: Address, grant_duration_seconds: u64) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        admin,
        grant_duration_seconds,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_config_updated(env: &Env, admin: Address, grant_duration_seconds: u64) {
    let topics = (symbol_short!("CFG_UPD"), admin.clone());
    let data = ConfigUpdatedEvent {
        admin,
        grant_duration_seconds,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an event when a principal is registered.
/// This event includes the principal address, role, display name, and timestamp.
pub fn publish_principal_registered(env: &Env, principal: Address, role: Role, name: String) {
    let topics = (symbol_short!("PRIN_REG"), principal.clone());
    let data = PrincipalRegisteredEvent {
        principal,
        role,
        name,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an event when a pending access request is created.
pub fn publish_access_requested(env: &Env, grant_id: u64, requester: Address, subject: Address) {
    let topics = (symbol_short!("ACC_REQ"), requester.clone(), subject.clone());
    let data = AccessRequestedEvent {
        grant_id,
        requester,
        subject,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an event when an access request is resolved.
/// This event includes the grant id, both parties, the new status and the expiry, if any.
pub fn publish_access_responded(
    env: &Env,
    grant_id: u64,
    requester: Address,
    subject: Address,
    status: GrantStatus,
    expires_at: Option<u64>,
) {
    let topics = (symbol_short!("ACC_RSP"), requester.clone(), subject.clone());
    let data = AccessRespondedEvent {
        grant_id,
        requester,
        subject,
        status,
        expires_at,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_notification_sent(
    env: &Env,
    notification_id: u64,
    recipient: Address,
    kind: NotificationKind,
    related_grant: Option<u64>,
) {
    let topics = (symbol_short!("NOTIFY"), recipient.clone());
    let data = NotificationSentEvent {
        notification_id,
        recipient,
        kind,
        related_grant,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_notifications_read(env: &Env, recipient: Address, count: u32) {
    let topics = (symbol_short!("NTF_READ"), recipient.clone());
    let data = NotificationsReadEvent {
        recipient,
        count,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_report_added(env: &Env, report_id: u64, patient: Address, uploaded_by: Address) {
    let topics = (symbol_short!("RPT_ADD"), patient.clone());
    let data = ReportAddedEvent {
        report_id,
        patient,
        uploaded_by,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_report_deleted(env: &Env, report_id: u64, patient: Address, deleted_by: Address) {
    let topics = (symbol_short!("RPT_DEL"), patient.clone());
    let data = ReportDeletedEvent {
        report_id,
        patient,
        deleted_by,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an error event for monitoring and indexing.
/// The topics carry category and severity so indexers can filter without decoding the payload.
pub fn publish_error(env: &Env, error_code: u32, context: ErrorContext) {
    let topics = (
        symbol_short!("ERROR"),
        context.category.clone(),
        context.severity.clone(),
    );
    let data = (
        error_code,
        context.category,
        context.severity,
        context.message,
        context.user,
        context.resource_id,
        context.retryable,
        context.timestamp,
    );
    env.events().publish(topics, data);
}

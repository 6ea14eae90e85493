//! Access request lifecycle: the only writer of `AccessGrant::status`.
//!
//! ```text
//! [Pending] --accepted--> [Accepted] --(expires_at <= now)--> no longer effective
//! [Pending] --rejected--> [Rejected]
//! ```
//!
//! Grant writes always commit before any notification is emitted, and a
//! failed notification never fails the transition.

use soroban_sdk::{Address, Env, String};

use crate::errors::{create_error_context, log_error};
use crate::notifications::{self, NotificationKind};
use crate::{config, directory, events, grant_store, validation};
use crate::{AccessGrant, ContractError, GrantStatus, Role};

/// Opens a pending request from `requester` for the patient behind `subject_code`.
///
/// Only registered doctors may ask for access.
pub fn request_access(
    env: &Env,
    requester: &Address,
    subject_code: &String,
) -> Result<AccessGrant, ContractError> {
    let subject = directory::resolve_patient_code(env, subject_code)?;

    let principal =
        directory::get_principal(env, requester).ok_or(ContractError::PrincipalNotFound)?;
    if principal.role != Role::Doctor {
        return Err(ContractError::AccessDenied);
    }

    let grant = grant_store::create_grant(env, requester, &subject)?;

    events::publish_access_requested(env, grant.id, requester.clone(), subject.clone());

    notify(
        env,
        &subject,
        requester,
        principal.name,
        NotificationKind::AccessRequested,
        grant.id,
    );

    Ok(grant)
}

/// Applies the subject's decision to a pending grant.
///
/// Checks run in a fixed order: the grant must exist, the responder must
/// be its subject, the decision must parse, and the grant must still be
/// pending.
pub fn respond_to_access(
    env: &Env,
    grant_id: u64,
    responder: &Address,
    decision: &String,
) -> Result<AccessGrant, ContractError> {
    let grant = grant_store::get_grant(env, grant_id).ok_or(ContractError::GrantNotFound)?;

    if grant.subject != *responder {
        return Err(ContractError::AccessDenied);
    }

    let new_status = validation::parse_decision(env, decision)?;
    let duration = config::grant_duration(env)?;

    let updated = grant_store::update_status(env, grant_id, new_status.clone(), duration)?;

    notifications::mark_read_for_grant(env, responder, grant_id);

    events::publish_access_responded(
        env,
        grant_id,
        updated.requester.clone(),
        updated.subject.clone(),
        new_status.clone(),
        updated.expires_at,
    );

    let kind = match new_status {
        GrantStatus::Accepted => NotificationKind::AccessAccepted,
        _ => NotificationKind::AccessRejected,
    };
    notify(
        env,
        &updated.requester,
        responder,
        directory::display_name(env, responder),
        kind,
        grant_id,
    );

    Ok(updated)
}

/// Best-effort delivery: failures go to the error log and the event stream.
fn notify(
    env: &Env,
    recipient: &Address,
    sender: &Address,
    sender_name: String,
    kind: NotificationKind,
    grant_id: u64,
) {
    if let Err(err) =
        notifications::emit(env, recipient, sender, sender_name, kind, Some(grant_id))
    {
        let resource_id = String::from_str(env, "notify");
        let context =
            create_error_context(env, err, Some(recipient.clone()), Some(resource_id.clone()));
        log_error(env, err, Some(recipient.clone()), Some(resource_id));
        events::publish_error(env, err as u32, context);
    }
}

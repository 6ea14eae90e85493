use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use crate::{events, ContractError};

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

const NOTIFICATION_COUNTER: Symbol = symbol_short!("NTF_CTR");

/// Notifications kept per recipient. A full inbox makes room by dropping
/// its oldest read entry, or its oldest entry when nothing has been read.
pub const MAX_INBOX_SIZE: u32 = 50;

/// Unread request notices one sender may hold in a single inbox.
pub const MAX_UNREAD_REQUESTS_PER_SENDER: u32 = 10;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NotificationKind {
    AccessRequested,
    AccessAccepted,
    AccessRejected,
    System,
}

impl NotificationKind {
    fn message(&self) -> &'static str {
        match self {
            NotificationKind::AccessRequested => "New access request for your records",
            NotificationKind::AccessAccepted => "Your access request was accepted",
            NotificationKind::AccessRejected => "Your access request was rejected",
            NotificationKind::System => "System notice",
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub recipient: Address,
    pub sender: Address,
    pub sender_name: String,
    pub kind: NotificationKind,
    pub message: String,
    pub related_grant: Option<u64>,
    pub read: bool,
    pub created_at: u64,
}

/// Inbox index entry. Mirrors the fields quota, eviction and
/// mark-by-grant need so those never load the notifications themselves.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InboxEntry {
    pub id: u64,
    pub sender: Address,
    pub kind: NotificationKind,
    pub related_grant: Option<u64>,
    pub read: bool,
}

fn notification_key(id: u64) -> (Symbol, u64) {
    (symbol_short!("NOTIF"), id)
}

fn inbox_key(recipient: &Address) -> (Symbol, Address) {
    (symbol_short!("INBOX"), recipient.clone())
}

fn load_inbox(env: &Env, recipient: &Address) -> Vec<InboxEntry> {
    env.storage()
        .persistent()
        .get(&inbox_key(recipient))
        .unwrap_or(Vec::new(env))
}

fn save_inbox(env: &Env, recipient: &Address, inbox: &Vec<InboxEntry>) {
    let key = inbox_key(recipient);
    env.storage().persistent().set(&key, inbox);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn save(env: &Env, notification: &Notification) {
    let key = notification_key(notification.id);
    env.storage().persistent().set(&key, notification);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn position_of(inbox: &Vec<InboxEntry>, id: u64) -> Option<u32> {
    inbox
        .iter()
        .position(|entry| entry.id == id)
        .map(|pos| pos as u32)
}

/// Drops the oldest read entry, or the oldest entry if none is read.
fn evict_one(env: &Env, inbox: &mut Vec<InboxEntry>) {
    let pos = inbox
        .iter()
        .position(|entry| entry.read)
        .map(|pos| pos as u32)
        .unwrap_or(0);
    if let Some(evicted) = inbox.get(pos) {
        inbox.remove(pos);
        env.storage()
            .persistent()
            .remove(&notification_key(evicted.id));
    }
}

/// Delivers one notification to `recipient`'s inbox.
///
/// Fails with `SenderQuotaExceeded` when `sender` already holds
/// MAX_UNREAD_REQUESTS_PER_SENDER unread request notices there.
pub fn emit(
    env: &Env,
    recipient: &Address,
    sender: &Address,
    sender_name: String,
    kind: NotificationKind,
    related_grant: Option<u64>,
) -> Result<u64, ContractError> {
    let mut inbox = load_inbox(env, recipient);

    if kind == NotificationKind::AccessRequested {
        let unread_from_sender = inbox
            .iter()
            .filter(|e| {
                !e.read && e.kind == NotificationKind::AccessRequested && e.sender == *sender
            })
            .count() as u32;
        if unread_from_sender >= MAX_UNREAD_REQUESTS_PER_SENDER {
            return Err(ContractError::SenderQuotaExceeded);
        }
    }

    if inbox.len() >= MAX_INBOX_SIZE {
        evict_one(env, &mut inbox);
    }

    let id: u64 = env
        .storage()
        .instance()
        .get(&NOTIFICATION_COUNTER)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&NOTIFICATION_COUNTER, &id);

    let notification = Notification {
        id,
        recipient: recipient.clone(),
        sender: sender.clone(),
        sender_name,
        message: String::from_str(env, kind.message()),
        kind: kind.clone(),
        related_grant,
        read: false,
        created_at: env.ledger().timestamp(),
    };
    save(env, &notification);

    inbox.push_back(InboxEntry {
        id,
        sender: sender.clone(),
        kind: kind.clone(),
        related_grant,
        read: false,
    });
    save_inbox(env, recipient, &inbox);

    events::publish_notification_sent(env, id, recipient.clone(), kind, related_grant);

    Ok(id)
}

pub fn get(env: &Env, id: u64) -> Option<Notification> {
    env.storage().persistent().get(&notification_key(id))
}

/// Recipient's notifications, newest first.
pub fn list_for(env: &Env, recipient: &Address) -> Vec<Notification> {
    let mut out = Vec::new(env);
    for entry in load_inbox(env, recipient).iter().rev() {
        if let Some(notification) = get(env, entry.id) {
            out.push_back(notification);
        }
    }
    out
}

pub fn unread_count(env: &Env, recipient: &Address) -> u32 {
    load_inbox(env, recipient)
        .iter()
        .filter(|entry| !entry.read)
        .count() as u32
}

fn owned_by(env: &Env, caller: &Address, id: u64) -> Result<Notification, ContractError> {
    let notification = get(env, id).ok_or(ContractError::NotificationNotFound)?;
    if notification.recipient != *caller {
        return Err(ContractError::AccessDenied);
    }
    Ok(notification)
}

pub fn mark_read(env: &Env, caller: &Address, id: u64) -> Result<(), ContractError> {
    let mut notification = owned_by(env, caller, id)?;
    if notification.read {
        return Ok(());
    }

    notification.read = true;
    save(env, &notification);

    let mut inbox = load_inbox(env, caller);
    if let Some(pos) = position_of(&inbox, id) {
        if let Some(mut entry) = inbox.get(pos) {
            entry.read = true;
            inbox.set(pos, entry);
            save_inbox(env, caller, &inbox);
        }
    }

    events::publish_notifications_read(env, caller.clone(), 1);
    Ok(())
}

/// Marks every unread notification in `recipient`'s inbox tied to
/// `grant_id` as read. Returns how many changed.
pub fn mark_read_for_grant(env: &Env, recipient: &Address, grant_id: u64) -> u32 {
    let mut inbox = load_inbox(env, recipient);
    let mut changed = 0u32;

    for pos in 0..inbox.len() {
        let Some(mut entry) = inbox.get(pos) else {
            continue;
        };
        if entry.read || entry.related_grant != Some(grant_id) {
            continue;
        }
        if let Some(mut notification) = get(env, entry.id) {
            notification.read = true;
            save(env, &notification);
        }
        entry.read = true;
        inbox.set(pos, entry);
        changed = changed.saturating_add(1);
    }

    if changed > 0 {
        save_inbox(env, recipient, &inbox);
        events::publish_notifications_read(env, recipient.clone(), changed);
    }
    changed
}

pub fn delete(env: &Env, caller: &Address, id: u64) -> Result<(), ContractError> {
    owned_by(env, caller, id)?;

    let mut inbox = load_inbox(env, caller);
    if let Some(pos) = position_of(&inbox, id) {
        inbox.remove(pos);
        save_inbox(env, caller, &inbox);
    }
    env.storage().persistent().remove(&notification_key(id));

    Ok(())
}

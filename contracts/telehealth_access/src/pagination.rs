use soroban_sdk::{Env, Vec};

/// Largest page any listing returns, whatever `limit` the caller asks for.
/// Each listed record is its own ledger entry, so a page must stay well
/// inside the per-invocation footprint.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Newest-first page over an append-ordered id index.
pub fn newest_first(env: &Env, ids: &Vec<u64>, offset: u32, limit: u32) -> Vec<u64> {
    let limit = limit.min(MAX_PAGE_SIZE);
    let mut page = Vec::new(env);
    for id in ids.iter().rev().skip(offset as usize).take(limit as usize) {
        page.push_back(id);
    }
    page
}

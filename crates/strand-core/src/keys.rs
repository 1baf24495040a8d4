//! Persisted-state key layout (spec §6), for callers that attach a
//! persistence collaborator. This crate only formats/parses the keys; it
//! never touches disk itself.

use crate::identifiers::LockId;

/// `audit:{unix_nanos:020d}:{lock_id}`
pub fn audit_key(unix_nanos: u128, lock_id: LockId) -> String {
    format!("audit:{:020}:{}", unix_nanos, lock_id.uuid())
}

/// Ascending-timestamp range for an audit scan `[audit:{start_ns}, audit:{end_ns}]`.
pub fn audit_range(start_ns: u128, end_ns: u128) -> (String, String) {
    (
        format!("audit:{:020}", start_ns),
        format!("audit:{:020}", end_ns),
    )
}

/// `doc:{collection}:{doc_id}`
pub fn doc_key(collection: &str, doc_id: &str) -> String {
    format!("doc:{}:{}", collection, doc_id)
}

/// `snap:{node_id}:{seq:020d}`
pub fn snapshot_key(node_id: &str, seq: u64) -> String {
    format!("snap:{}:{:020}", node_id, seq)
}

//! Lock service data model (spec §3, §4.1).

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use strand_core::identifiers::{IntentId, LockId, NodeId};

/// A `(file, line-range)` region targeted by a lock or an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockTarget {
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl LockTarget {
    pub fn new(file_path: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file_path: file_path.into(),
            start_line,
            end_line,
        }
    }

    /// `[a,b]` and `[c,d]` on the same file overlap iff `max(a,c) <= min(b,d)`.
    pub fn overlaps(&self, other: &LockTarget) -> bool {
        self.file_path == other.file_path
            && self.start_line.max(other.start_line) <= self.end_line.min(other.end_line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockState {
    Pending,
    Held,
    Released,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticLock {
    pub id: LockId,
    pub holder_id: NodeId,
    pub holder_name: String,
    pub target: LockTarget,
    pub intention: String,
    pub acquired_at: SystemTime,
    pub expires_at: SystemTime,
    pub state: LockState,
}

impl SemanticLock {
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now > self.expires_at
    }
}

/// Declared claim on a target during the announce-window (spec §4.1 step 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockIntent {
    pub intent_id: IntentId,
    pub lock_id: LockId,
    pub target: LockTarget,
    pub holder_id: NodeId,
    pub declared_at: SystemTime,
    pub deadline: SystemTime,
}

impl LockIntent {
    /// Arbitration key: lowest `(declared_at, holder_id)` lexicographically wins.
    pub fn arbitration_key(&self) -> (SystemTime, String) {
        (self.declared_at, self.holder_id.to_string())
    }
}

pub const DEFAULT_ANNOUNCE_WINDOW: Duration = Duration::from_millis(250);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_inclusive_and_per_file() {
        let a = LockTarget::new("x.go", 10, 20);
        let b = LockTarget::new("x.go", 15, 25);
        let c = LockTarget::new("x.go", 21, 30);
        let d = LockTarget::new("y.go", 10, 20);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn expiry_is_wall_clock() {
        let lock = SemanticLock {
            id: LockId::new(),
            holder_id: NodeId::new(),
            holder_name: "a".into(),
            target: LockTarget::new("x.go", 1, 5),
            intention: "edit".into(),
            acquired_at: SystemTime::UNIX_EPOCH,
            expires_at: SystemTime::UNIX_EPOCH + Duration::from_secs(1),
            state: LockState::Held,
        };
        assert!(!lock.is_expired_at(SystemTime::UNIX_EPOCH));
        assert!(lock.is_expired_at(SystemTime::UNIX_EPOCH + Duration::from_secs(2)));
    }
}

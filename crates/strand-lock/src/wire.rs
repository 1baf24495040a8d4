//! Wire messages published on the `lock.intent` / `lock.acquire` / `lock.release` topics (spec §6).

use crate::types::{LockIntent, SemanticLock};
use serde::{Deserialize, Serialize};
use strand_core::identifiers::LockId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LockWireMessage {
    #[serde(rename = "lock_intent")]
    Intent(LockIntent),
    #[serde(rename = "lock_acquired")]
    Acquired(SemanticLock),
    #[serde(rename = "lock_released")]
    Released { lock_id: LockId },
}

pub const TOPIC_INTENT: &str = "lock.intent";
pub const TOPIC_ACQUIRE: &str = "lock.acquire";
pub const TOPIC_RELEASE: &str = "lock.release";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_message_tags_correctly() {
        let msg = LockWireMessage::Released {
            lock_id: LockId::new(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"lock_released\""));
        let back: LockWireMessage = serde_json::from_str(&json).unwrap();
        match back {
            LockWireMessage::Released { .. } => {}
            _ => panic!("wrong variant"),
        }
    }
}

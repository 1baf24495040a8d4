//! Wire messages published on the `cluster.ping` topic (spec §6): periodic
//! state-snapshot exchange that backs the Lock Service's partition recovery
//! (spec §4.1 "Failures").

use crate::snapshot::StateSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NetWireMessage {
    #[serde(rename = "snapshot")]
    Snapshot(StateSnapshot),
}

pub const TOPIC_CLUSTER_PING: &str = "cluster.ping";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::time::SystemTime;
    use strand_core::identifiers::NodeId;
    use strand_core::VectorClock;

    #[test]
    fn snapshot_message_tags_as_snapshot() {
        let msg = NetWireMessage::Snapshot(StateSnapshot {
            seq_num: 1,
            node_id: NodeId::new(),
            vector_clock: VectorClock::new(),
            locks: HashMap::new(),
            content_cids: HashSet::new(),
            peers: HashMap::new(),
            timestamp: SystemTime::now(),
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"snapshot\""));
        let back: NetWireMessage = serde_json::from_str(&json).unwrap();
        match back {
            NetWireMessage::Snapshot(_) => {}
        }
    }
}

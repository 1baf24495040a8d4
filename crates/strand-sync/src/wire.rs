use crate::types::Delta;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncWireMessage {
    #[serde(rename = "delta")]
    Delta(Delta),
}

pub const TOPIC_CONTEXT_SYNC: &str = "context.sync";

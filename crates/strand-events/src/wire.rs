use crate::types::{Event, Interest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventWireMessage {
    #[serde(rename = "event")]
    Event(Event),
    #[serde(rename = "interest_changed")]
    InterestChanged(Interest),
}

pub const TOPIC_EVENTS: &str = "events";
pub const TOPIC_INTEREST: &str = "interest.sync";

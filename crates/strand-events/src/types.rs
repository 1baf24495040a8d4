//! Event and Interest data model (spec §3, §4.3).

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use strand_core::identifiers::{AgentId, EventId, NodeId};

/// The closed set of event kinds the router will carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    FileChange,
    ContextShared,
    LockAcquired,
    LockReleased,
    LockConflict,
    AgentJoined,
    AgentLeft,
    InterestChanged,
}

/// A routed event. `file_path` and `mentions` are optional: most kinds carry
/// a `file_path` for glob matching, `mentions` lets `DirectMentions`
/// interests match events that name an agent without targeting a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub kind: EventKind,
    pub source_id: NodeId,
    pub file_path: Option<String>,
    pub mentions: Vec<AgentId>,
    pub body: serde_json::Value,
    pub timestamp: SystemTime,
}

/// Breadth of an agent's subscription (spec §3 Interest table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestLevel {
    All,
    DirectMentions,
    None,
}

/// An agent's declared subscription: glob patterns plus a level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interest {
    pub agent_id: AgentId,
    pub patterns: Vec<String>,
    pub level: InterestLevel,
}

impl Interest {
    /// Spec §4.3 "Interest matching". `None` never matches; `All` always
    /// does; `DirectMentions` matches a direct mention or a glob hit on
    /// `file_path`.
    pub fn matches(&self, event: &Event) -> bool {
        match self.level {
            InterestLevel::None => false,
            InterestLevel::All => true,
            InterestLevel::DirectMentions => {
                event.source_id.uuid() == self.agent_id.uuid()
                    || event.mentions.contains(&self.agent_id)
                    || self.matches_any_pattern(event)
            }
        }
    }

    fn matches_any_pattern(&self, event: &Event) -> bool {
        let Some(file_path) = &event.file_path else {
            return false;
        };
        self.patterns
            .iter()
            .any(|pattern| strand_core::glob::matches(pattern, file_path))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouterStats {
    pub delivered: u64,
    pub dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, file_path: Option<&str>) -> Event {
        Event {
            event_id: EventId::new(),
            kind,
            source_id: NodeId::new(),
            file_path: file_path.map(String::from),
            mentions: Vec::new(),
            body: serde_json::Value::Null,
            timestamp: SystemTime::now(),
        }
    }

    #[test]
    fn all_level_matches_everything() {
        let interest = Interest {
            agent_id: AgentId::new(),
            patterns: Vec::new(),
            level: InterestLevel::All,
        };
        assert!(interest.matches(&event(EventKind::FileChange, None)));
    }

    #[test]
    fn none_level_matches_nothing() {
        let interest = Interest {
            agent_id: AgentId::new(),
            patterns: vec!["**".into()],
            level: InterestLevel::None,
        };
        assert!(!interest.matches(&event(EventKind::FileChange, Some("src/x.go"))));
    }
}

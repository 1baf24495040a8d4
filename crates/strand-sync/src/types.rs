//! Context sync data model (spec §3, §4.2).

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use strand_core::identifiers::{DeltaId, NodeId};
use strand_core::VectorClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaType {
    FileChange,
    SymbolEdit,
    Heartbeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolDiffType {
    Added,
    Removed,
    Modified,
}

impl SymbolDiffType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolDiffType::Added => "added",
            SymbolDiffType::Removed => "removed",
            SymbolDiffType::Modified => "modified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub symbol_type: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDiff {
    pub diff_type: SymbolDiffType,
    pub symbol: Symbol,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub diffs: Vec<SymbolDiff>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaPayload {
    pub file_path: Option<String>,
    pub file_diff: FileDiff,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delta {
    pub delta_id: DeltaId,
    pub source_id: NodeId,
    pub source_name: String,
    pub vector_clock: VectorClock,
    pub delta_type: DeltaType,
    pub payload: DeltaPayload,
    pub timestamp: SystemTime,
}

#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    pub total_deltas: u64,
    pub watched_files: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_diff_type_names_match_spec_wording() {
        assert_eq!(SymbolDiffType::Added.as_str(), "added");
        assert_eq!(SymbolDiffType::Modified.as_str(), "modified");
    }
}

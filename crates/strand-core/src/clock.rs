//! Vector clocks for causal ordering of deltas (spec §3, §4.2, §8).

use crate::identifiers::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorClock(BTreeMap<NodeId, u64>);

impl VectorClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: NodeId) -> u64 {
        self.0.get(&node).copied().unwrap_or(0)
    }

    /// Bump `node`'s entry to the next sequence number and return the new clock.
    pub fn advance(&mut self, node: NodeId) -> u64 {
        let entry = self.0.entry(node).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Per-node max merge: the semilattice join used everywhere clocks meet
    /// (delta ingestion, snapshot merge).
    pub fn merge(&self, other: &VectorClock) -> VectorClock {
        let mut merged = self.0.clone();
        for (node, &seq) in &other.0 {
            let entry = merged.entry(*node).or_insert(0);
            *entry = (*entry).max(seq);
        }
        VectorClock(merged)
    }

    pub fn merge_in_place(&mut self, other: &VectorClock) {
        for (node, &seq) in &other.0 {
            let entry = self.0.entry(*node).or_insert(0);
            *entry = (*entry).max(seq);
        }
    }

    /// `self <= other` iff every entry in `self` is <= the corresponding entry in `other`.
    pub fn happens_before_or_eq(&self, other: &VectorClock) -> bool {
        self.0.iter().all(|(node, &seq)| seq <= other.get(*node))
            && other
                .0
                .keys()
                .all(|node| self.get(*node) <= other.get(*node))
    }

    /// Two clocks are concurrent iff neither is `<=` the other.
    pub fn is_concurrent_with(&self, other: &VectorClock) -> bool {
        !self.happens_before_or_eq(other) && !other.happens_before_or_eq(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, u64)> + '_ {
        self.0.iter().map(|(n, s)| (*n, *s))
    }
}

impl FromIterator<(NodeId, u64)> for VectorClock {
    fn from_iter<T: IntoIterator<Item = (NodeId, u64)>>(iter: T) -> Self {
        VectorClock(iter.into_iter().collect())
    }
}

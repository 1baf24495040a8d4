//! Context Sync Manager: delta production/ingestion, conflict detection,
//! and the embedding pipeline (spec §4.2).

use crate::error::Result;
use crate::types::{Delta, DeltaPayload, DeltaType, SyncStats};
use crate::wire::{SyncWireMessage, TOPIC_CONTEXT_SYNC};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::SystemTime;
use strand_core::collab::{Broadcast, DocumentRecord, Embed, VectorStore};
use strand_core::identifiers::{DeltaId, NodeId};
use strand_core::VectorClock;

#[derive(Debug, Clone)]
pub struct ConflictNotice {
    pub file_path: String,
    pub remote_delta_id: DeltaId,
    pub remote_vector_clock: VectorClock,
    pub local_vector_clock: VectorClock,
}

pub type ConflictHandler = Arc<dyn Fn(ConflictNotice) + Send + Sync>;

struct Inner {
    log: tokio::sync::RwLock<Vec<Delta>>,
    seen_ids: tokio::sync::RwLock<HashSet<DeltaId>>,
    last_applied_clock: tokio::sync::RwLock<HashMap<String, VectorClock>>,
    local_clock: tokio::sync::RwLock<VectorClock>,
    conflict_handler: tokio::sync::RwLock<Option<ConflictHandler>>,
}

#[derive(Clone)]
pub struct ContextSyncManager {
    node_id: NodeId,
    broadcast: Arc<dyn Broadcast>,
    embed: Arc<dyn Embed>,
    vector_store: Arc<dyn VectorStore>,
    inner: Arc<Inner>,
}

impl ContextSyncManager {
    pub fn new(
        node_id: NodeId,
        broadcast: Arc<dyn Broadcast>,
        embed: Arc<dyn Embed>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            node_id,
            broadcast,
            embed,
            vector_store,
            inner: Arc::new(Inner {
                log: tokio::sync::RwLock::new(Vec::new()),
                seen_ids: tokio::sync::RwLock::new(HashSet::new()),
                last_applied_clock: tokio::sync::RwLock::new(HashMap::new()),
                local_clock: tokio::sync::RwLock::new(VectorClock::new()),
                conflict_handler: tokio::sync::RwLock::new(None),
            }),
        }
    }

    pub async fn set_conflict_handler(&self, handler: ConflictHandler) {
        *self.inner.conflict_handler.write().await = Some(handler);
    }

    /// Assigns the next local vector-clock entry, appends to the log, and
    /// broadcasts. Locally-produced deltas are applied without a conflict
    /// check — there is nothing to be concurrent with.
    pub async fn produce_delta(
        &self,
        source_name: impl Into<String>,
        delta_type: DeltaType,
        payload: DeltaPayload,
    ) -> Result<Delta> {
        let seq = {
            let mut clock = self.inner.local_clock.write().await;
            clock.advance(self.node_id);
            clock.clone()
        };
        let delta = Delta {
            delta_id: DeltaId::new(),
            source_id: self.node_id,
            source_name: source_name.into(),
            vector_clock: seq,
            delta_type,
            payload,
            timestamp: SystemTime::now(),
        };

        self.inner.seen_ids.write().await.insert(delta.delta_id);
        self.record_causal_state(&delta).await;
        self.apply(&delta).await;

        let broadcast = self.broadcast.clone();
        let bytes = strand_core::wire::encode(&SyncWireMessage::Delta(delta.clone()));
        tokio::spawn(async move {
            if let Err(e) = broadcast.broadcast(TOPIC_CONTEXT_SYNC, bytes).await {
                tracing::warn!(error = %e, "delta broadcast failed");
            }
        });

        Ok(delta)
    }

    /// Merges the clock, dedupes by `delta_id`, detects concurrent edits,
    /// applies, and forwards into the embedding pipeline.
    pub async fn receive_delta(&self, delta: Delta) -> Result<()> {
        {
            let mut seen = self.inner.seen_ids.write().await;
            if !seen.insert(delta.delta_id) {
                return Ok(());
            }
        }

        self.record_causal_state(&delta).await;
        self.apply(&delta).await;
        Ok(())
    }

    pub async fn stats(&self) -> SyncStats {
        let log = self.inner.log.read().await;
        let watched: HashSet<&str> = log
            .iter()
            .filter_map(|d| d.payload.file_path.as_deref())
            .collect();
        SyncStats {
            total_deltas: log.len() as u64,
            watched_files: watched.len(),
        }
    }

    pub async fn log(&self) -> Vec<Delta> {
        self.inner.log.read().await.clone()
    }

    /// Merges `delta`'s clock into `last_applied_clock[file_path]`, flagging
    /// a conflict via the handler when the two are concurrent rather than
    /// causally ordered. Runs for both locally-produced and received deltas
    /// so a node's own history counts as prior state for later comparisons.
    async fn record_causal_state(&self, delta: &Delta) {
        let Some(file_path) = delta.payload.file_path.clone() else {
            return;
        };
        let mut last = self.inner.last_applied_clock.write().await;
        let entry = last.entry(file_path.clone()).or_default();
        if entry.iter().next().is_some() && delta.vector_clock.is_concurrent_with(entry) {
            let notice = ConflictNotice {
                file_path,
                remote_delta_id: delta.delta_id,
                remote_vector_clock: delta.vector_clock.clone(),
                local_vector_clock: entry.clone(),
            };
            entry.merge_in_place(&delta.vector_clock);
            drop(last);
            if let Some(handler) = self.inner.conflict_handler.read().await.clone() {
                handler(notice);
            }
        } else {
            entry.merge_in_place(&delta.vector_clock);
        }
    }

    /// Applies an already-conflict-checked delta: log it, and — for a
    /// `FileChange` with a non-empty path — run the embedding pipeline.
    async fn apply(&self, delta: &Delta) {
        self.inner.log.write().await.push(delta.clone());

        if delta.delta_type != DeltaType::FileChange {
            return;
        }
        let Some(file_path) = &delta.payload.file_path else {
            return;
        };
        if file_path.is_empty() {
            return;
        }

        let mut description = format!("File change: {} from {}", file_path, delta.source_name);
        for diff in &delta.payload.file_diff.diffs {
            description.push('\n');
            description.push_str(&format!(
                "{} {}: {}",
                diff.diff_type.as_str(),
                diff.symbol.symbol_type,
                diff.symbol.name
            ));
        }

        let embedding = match self.embed.embed(&description).await {
            Ok(vec) => vec,
            Err(e) => {
                tracing::warn!(error = %e, file_path, "embedding request failed, skipping index");
                return;
            }
        };

        let doc = DocumentRecord {
            content: description,
            embedding,
            file_path: Some(file_path.clone()),
            metadata: Default::default(),
        };
        if let Err(e) = self.vector_store.insert(doc).await {
            tracing::warn!(error = %e, file_path, "vector store insert failed");
            return;
        }

        let vector_store = self.vector_store.clone();
        tokio::spawn(async move {
            if let Err(e) = vector_store.flush().await {
                tracing::warn!(error = %e, "vector store flush failed");
            }
        });
    }
}

//! Injected collaborator traits (spec §6).
//!
//! These are the narrow interfaces the core consumes from components that
//! are explicitly out of scope here (embedding providers, vector stores,
//! persistence, token accounting, the raw broadcast transport). This crate
//! never implements them for production use; `test_support` ships no-op
//! stand-ins for wiring tests.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Publishes raw bytes on a named topic. Errors are reported but not fatal
/// (spec §4.1 "Failures").
#[async_trait]
pub trait Broadcast: Send + Sync {
    async fn broadcast(&self, topic: &str, bytes: Vec<u8>) -> Result<()>;
}

/// Requests an embedding vector for a piece of text.
#[async_trait]
pub trait Embed: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub content: String,
    pub embedding: Vec<f32>,
    pub file_path: Option<String>,
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document: DocumentRecord,
    pub score: f32,
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub limit: usize,
    pub min_score: f32,
}

/// The embedding-indexed content store (out of scope to implement here).
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn insert(&self, doc: DocumentRecord) -> Result<()>;
    async fn search(&self, vector: &[f32], opts: SearchOptions) -> Result<Vec<SearchHit>>;
    async fn flush(&self) -> Result<()>;
}

/// Best-effort delta persistence; errors are logged, never propagated.
#[async_trait]
pub trait PersistDelta: Send + Sync {
    async fn persist_delta(&self, delta_id: &str, bytes: &[u8]) -> Result<()>;
}

/// Best-effort audit persistence; errors are logged, never propagated.
#[async_trait]
pub trait PersistAudit: Send + Sync {
    async fn persist_audit(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// Fire-and-forget token accounting, entirely out of scope to implement.
pub trait TokenTracker: Send + Sync {
    fn record(&self, category: &str, tokens: u64, model: &str, metadata: &HashMap<String, Value>);
}

#[cfg(feature = "test-support")]
pub mod test_support {
    use super::*;

    pub struct NullBroadcast;

    #[async_trait]
    impl Broadcast for NullBroadcast {
        async fn broadcast(&self, _topic: &str, _bytes: Vec<u8>) -> Result<()> {
            Ok(())
        }
    }

    pub struct NullEmbed;

    #[async_trait]
    impl Embed for NullEmbed {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    pub struct NullVectorStore;

    #[async_trait]
    impl VectorStore for NullVectorStore {
        async fn insert(&self, _doc: DocumentRecord) -> Result<()> {
            Ok(())
        }
        async fn search(&self, _vector: &[f32], _opts: SearchOptions) -> Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }
        async fn flush(&self) -> Result<()> {
            Ok(())
        }
    }

    pub struct NullPersist;

    #[async_trait]
    impl PersistDelta for NullPersist {
        async fn persist_delta(&self, _delta_id: &str, _bytes: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl PersistAudit for NullPersist {
        async fn persist_audit(&self, _key: &str, _bytes: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    pub struct NullTokenTracker;

    impl TokenTracker for NullTokenTracker {
        fn record(&self, _category: &str, _tokens: u64, _model: &str, _metadata: &HashMap<String, Value>) {}
    }
}

//! Context Sync Manager: delta production/ingestion, causal conflict
//! detection, and the embedding pipeline (spec §4.2). See
//! [`manager::ContextSyncManager`].

pub mod error;
pub mod manager;
pub mod types;
pub mod wire;

pub use error::{Result, SyncError};
pub use manager::{ConflictHandler, ConflictNotice, ContextSyncManager};
pub use types::{Delta, DeltaPayload, DeltaType, FileDiff, Symbol, SymbolDiff, SymbolDiffType, SyncStats};
pub use wire::{SyncWireMessage, TOPIC_CONTEXT_SYNC};

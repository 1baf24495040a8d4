//! Shared data model, error kinds, and wire formats for the Strand
//! peer-to-peer coordination substrate.
//!
//! This crate has no dependency on the other `strand-*` crates — it is the
//! leaf of the workspace's dependency graph.

pub mod cid;
pub mod clock;
pub mod collab;
pub mod error;
pub mod glob;
pub mod identifiers;
pub mod keys;
pub mod wire;

pub use clock::VectorClock;
pub use error::{Result, StrandError};
pub use identifiers::{AgentId, DeltaId, EventId, IntentId, LockId, NodeId};

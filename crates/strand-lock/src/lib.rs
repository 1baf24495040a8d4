//! Distributed advisory-lock engine over overlapping `(file, line-range)`
//! targets (spec §4.1). Three-phase protocol: announce intent, wait out
//! conflicts, commit. See [`service::LockService`].

pub mod config;
pub mod error;
pub mod service;
pub mod types;
pub mod wire;

pub use config::LockConfig;
pub use error::{LockError, Result};
pub use service::{LockEvent, LockEventHandler, LockService};
pub use types::{LockIntent, LockState, LockTarget, SemanticLock};
pub use wire::{LockWireMessage, TOPIC_ACQUIRE, TOPIC_INTENT, TOPIC_RELEASE};

//! Composition layer: wires the Lock Service, Context Sync Manager, Event
//! Router, and P2P Messaging Substrate behind the injected-collaborator
//! boundary into one running node (spec §9 "Design Notes").

pub mod agent;
pub mod config;
pub mod logging;

pub use agent::Agent;
pub use config::AgentConfig;
pub use logging::init_tracing;

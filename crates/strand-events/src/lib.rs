//! Event Router + Interest Manager: glob-matched typed event dispatch to
//! local subscribers and remote peers (spec §4.3). See
//! [`router::EventRouter`].

pub mod channel;
pub mod config;
pub mod error;
pub mod router;
pub mod types;
pub mod wire;

pub use channel::SubscriberChannel;
pub use config::EventRouterConfig;
pub use error::{EventError, Result};
pub use router::EventRouter;
pub use types::{Event, EventKind, Interest, InterestLevel, RouterStats};
pub use wire::{EventWireMessage, TOPIC_EVENTS, TOPIC_INTEREST};

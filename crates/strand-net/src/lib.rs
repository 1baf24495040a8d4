//! P2P Messaging Substrate: Pub/Sub Node, Batcher, Compressor, Content
//! Store, Snapshot Manager, Peer-Quality Monitor, and Topology Manager
//! (spec §4.4-4.7).

pub mod batch;
pub mod compress;
pub mod config;
pub mod content;
pub mod error;
pub mod pubsub;
pub mod quality;
pub mod snapshot;
pub mod topology;
pub mod wire;

pub use batch::{unbatch, BatchEnvelope, Batcher};
pub use compress::{compress, compress_if_above_threshold, decompress};
pub use config::{BatchConfig, ContentConfig, QualityConfig, TopologyConfig};
pub use content::{not_found, ContentMetadata, ContentStore};
pub use error::{NetError, Result};
pub use pubsub::{PubSubHub, PubSubMessage, PubSubNode, TopicQueue};
pub use quality::{score, PeerQualityMonitor, PeerSample, QualityClass};
pub use snapshot::{compute_delta, merge, LockSnapshotEntry, PeerInfo, SnapshotDelta, SnapshotManager, StateSnapshot};
pub use topology::{ElectionResult, Role, TopologyManager};
pub use wire::{NetWireMessage, TOPIC_CLUSTER_PING};

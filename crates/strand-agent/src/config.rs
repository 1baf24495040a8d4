//! Aggregate daemon configuration (spec ambient stack: every subsystem's
//! tunables collected behind one TOML-loadable struct, mirroring the
//! teacher's nested `AgentConfig`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use strand_core::StrandError;
use strand_events::EventRouterConfig;
use strand_lock::LockConfig;
use strand_net::{BatchConfig, ContentConfig, QualityConfig, TopologyConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub lock: SerializableLockConfig,
    #[serde(default)]
    pub events: SerializableEventRouterConfig,
    #[serde(default)]
    pub batch: SerializableBatchConfig,
    #[serde(default)]
    pub content: SerializableContentConfig,
    #[serde(default)]
    pub quality: SerializableQualityConfig,
    #[serde(default)]
    pub topology: SerializableTopologyConfig,
    #[serde(default)]
    pub pubsub_queue_capacity: usize,
    /// Cadence of the `cluster.ping` snapshot broadcast (spec §4.1
    /// "Failures" / §4.6 partition recovery). Not itself a sub-component
    /// config, so it lives on the daemon rather than in `strand-net`.
    #[serde(default = "default_snapshot_interval_ms")]
    pub snapshot_interval_ms: u64,
}

fn default_snapshot_interval_ms() -> u64 {
    30_000
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            lock: SerializableLockConfig::default(),
            events: SerializableEventRouterConfig::default(),
            batch: SerializableBatchConfig::default(),
            content: SerializableContentConfig::default(),
            quality: SerializableQualityConfig::default(),
            topology: SerializableTopologyConfig::default(),
            pubsub_queue_capacity: 256,
            snapshot_interval_ms: default_snapshot_interval_ms(),
        }
    }
}

impl AgentConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StrandError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| StrandError::Unavailable(format!("reading config: {e}")))?;
        toml::from_str(&text).map_err(|e| StrandError::Corrupted(format!("parsing config: {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableLockConfig {
    pub announce_window_ms: u64,
    pub reap_interval_ms: u64,
}

impl Default for SerializableLockConfig {
    fn default() -> Self {
        let d = LockConfig::default();
        Self {
            announce_window_ms: d.announce_window.as_millis() as u64,
            reap_interval_ms: d.reap_interval.as_millis() as u64,
        }
    }
}

impl From<SerializableLockConfig> for LockConfig {
    fn from(cfg: SerializableLockConfig) -> Self {
        LockConfig {
            announce_window: std::time::Duration::from_millis(cfg.announce_window_ms),
            reap_interval: std::time::Duration::from_millis(cfg.reap_interval_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableEventRouterConfig {
    pub channel_capacity: usize,
    pub dedup_window_ms: u64,
}

impl Default for SerializableEventRouterConfig {
    fn default() -> Self {
        let d = EventRouterConfig::default();
        Self {
            channel_capacity: d.channel_capacity,
            dedup_window_ms: d.dedup_window.as_millis() as u64,
        }
    }
}

impl From<SerializableEventRouterConfig> for EventRouterConfig {
    fn from(cfg: SerializableEventRouterConfig) -> Self {
        EventRouterConfig {
            channel_capacity: cfg.channel_capacity,
            dedup_window: std::time::Duration::from_millis(cfg.dedup_window_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableBatchConfig {
    pub max_count: usize,
    pub max_bytes: usize,
    pub max_delay_ms: u64,
}

impl Default for SerializableBatchConfig {
    fn default() -> Self {
        let d = BatchConfig::default();
        Self {
            max_count: d.max_count,
            max_bytes: d.max_bytes,
            max_delay_ms: d.max_delay.as_millis() as u64,
        }
    }
}

impl From<SerializableBatchConfig> for BatchConfig {
    fn from(cfg: SerializableBatchConfig) -> Self {
        BatchConfig {
            max_count: cfg.max_count,
            max_bytes: cfg.max_bytes,
            max_delay: std::time::Duration::from_millis(cfg.max_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableContentConfig {
    pub content_threshold: usize,
    pub max_size: usize,
    pub compression_threshold: usize,
}

impl Default for SerializableContentConfig {
    fn default() -> Self {
        let d = ContentConfig::default();
        Self {
            content_threshold: d.content_threshold,
            max_size: d.max_size,
            compression_threshold: d.compression_threshold,
        }
    }
}

impl From<SerializableContentConfig> for ContentConfig {
    fn from(cfg: SerializableContentConfig) -> Self {
        ContentConfig {
            content_threshold: cfg.content_threshold,
            max_size: cfg.max_size,
            compression_threshold: cfg.compression_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableQualityConfig {
    pub min_samples: u32,
    pub high_quality: f64,
    pub low_quality: f64,
}

impl Default for SerializableQualityConfig {
    fn default() -> Self {
        let d = QualityConfig::default();
        Self {
            min_samples: d.min_samples,
            high_quality: d.high_quality,
            low_quality: d.low_quality,
        }
    }
}

impl From<SerializableQualityConfig> for QualityConfig {
    fn from(cfg: SerializableQualityConfig) -> Self {
        QualityConfig {
            min_samples: cfg.min_samples,
            high_quality: cfg.high_quality,
            low_quality: cfg.low_quality,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableTopologyConfig {
    pub election_interval_ms: u64,
    pub min_uptime_ms: u64,
    pub min_connections: usize,
    pub min_score: f64,
    pub super_peer_ratio: f64,
    pub max_super_peers_per_leaf: usize,
    pub max_leaf_peers_per_super: usize,
}

impl Default for SerializableTopologyConfig {
    fn default() -> Self {
        let d = TopologyConfig::default();
        Self {
            election_interval_ms: d.election_interval.as_millis() as u64,
            min_uptime_ms: d.min_uptime.as_millis() as u64,
            min_connections: d.min_connections,
            min_score: d.min_score,
            super_peer_ratio: d.super_peer_ratio,
            max_super_peers_per_leaf: d.max_super_peers_per_leaf,
            max_leaf_peers_per_super: d.max_leaf_peers_per_super,
        }
    }
}

impl From<SerializableTopologyConfig> for TopologyConfig {
    fn from(cfg: SerializableTopologyConfig) -> Self {
        TopologyConfig {
            election_interval: std::time::Duration::from_millis(cfg.election_interval_ms),
            min_uptime: std::time::Duration::from_millis(cfg.min_uptime_ms),
            min_connections: cfg.min_connections,
            min_score: cfg.min_score,
            super_peer_ratio: cfg.super_peer_ratio,
            max_super_peers_per_leaf: cfg.max_super_peers_per_leaf,
            max_leaf_peers_per_super: cfg.max_leaf_peers_per_super,
        }
    }
}

use std::time::Duration;

/// Batcher limits, any one of which closes the current batch (spec §4.4).
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_count: usize,
    pub max_bytes: usize,
    pub max_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_count: 100,
            max_bytes: 64 * 1024,
            max_delay: Duration::from_millis(50),
        }
    }
}

/// Content-store and inline/reference envelope policy (spec §4.4, §4.5).
#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub content_threshold: usize,
    pub max_size: usize,
    pub compression_threshold: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            content_threshold: 8 * 1024,
            max_size: 256 * 1024 * 1024,
            compression_threshold: 8 * 1024,
        }
    }
}

/// Peer-quality scoring thresholds (spec §4.7).
#[derive(Debug, Clone)]
pub struct QualityConfig {
    pub min_samples: u32,
    pub high_quality: f64,
    pub low_quality: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_samples: 5,
            high_quality: 0.7,
            low_quality: 0.3,
        }
    }
}

/// Super-peer election policy (spec §4.7).
#[derive(Debug, Clone)]
pub struct TopologyConfig {
    pub election_interval: Duration,
    pub min_uptime: Duration,
    pub min_connections: usize,
    pub min_score: f64,
    pub super_peer_ratio: f64,
    pub max_super_peers_per_leaf: usize,
    pub max_leaf_peers_per_super: usize,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            election_interval: Duration::from_secs(30),
            min_uptime: Duration::from_secs(60),
            min_connections: 3,
            min_score: 0.7,
            super_peer_ratio: 0.1,
            max_super_peers_per_leaf: 3,
            max_leaf_peers_per_super: 20,
        }
    }
}

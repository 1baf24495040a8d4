//! Topology Manager (spec §4.7): periodic super-peer election, run against
//! a [`PeerQualityMonitor`] snapshot.

use crate::config::TopologyConfig;
use crate::quality::PeerQualityMonitor;
use std::time::{Duration, Instant};
use strand_core::identifiers::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leaf,
    Super,
}

/// One election decision. `uplinks`/`downlinks` are the highest-scored
/// candidates capped at the configured fan-out limits.
#[derive(Debug, Clone)]
pub struct ElectionResult {
    pub role: Role,
    pub uplinks: Vec<NodeId>,
    pub downlinks: Vec<NodeId>,
}

/// `started_at` is captured once at construction and must be persisted
/// across restarts by the caller (spec §9 open question: node-start-time
/// is otherwise a placeholder upstream).
pub struct TopologyManager {
    config: TopologyConfig,
    started_at: Instant,
    role: parking_lot::Mutex<Role>,
}

impl TopologyManager {
    pub fn new(config: TopologyConfig, started_at: Instant) -> Self {
        Self {
            config,
            started_at,
            role: parking_lot::Mutex::new(Role::Leaf),
        }
    }

    pub fn role(&self) -> Role {
        *self.role.lock()
    }

    /// Runs one election pass. `total_peers` and `current_super_peers` are
    /// cluster-wide counts supplied by the caller (membership tracking is
    /// outside this component's remit).
    pub fn elect(
        &self,
        monitor: &PeerQualityMonitor,
        total_peers: usize,
        current_super_peers: usize,
        now: Instant,
    ) -> ElectionResult {
        let uptime = now.duration_since(self.started_at);
        let target = (total_peers as f64 * self.config.super_peer_ratio).ceil() as usize;

        let mut role = self.role.lock();
        let eligible = uptime >= self.config.min_uptime
            && monitor.connection_count() >= self.config.min_connections
            && monitor.average_score() >= self.config.min_score;

        *role = match *role {
            Role::Leaf if eligible && current_super_peers < target => Role::Super,
            Role::Super if current_super_peers > target => Role::Leaf,
            other => other,
        };

        let candidates = monitor.super_peer_candidates();
        let (uplinks, downlinks) = match *role {
            Role::Leaf => (
                candidates
                    .into_iter()
                    .take(self.config.max_super_peers_per_leaf)
                    .map(|(id, _)| id)
                    .collect(),
                Vec::new(),
            ),
            Role::Super => (
                Vec::new(),
                candidates
                    .into_iter()
                    .take(self.config.max_leaf_peers_per_super)
                    .map(|(id, _)| id)
                    .collect(),
            ),
        };

        ElectionResult {
            role: *role,
            uplinks,
            downlinks,
        }
    }

    pub fn uptime(&self, now: Instant) -> Duration {
        now.duration_since(self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityConfig;
    use crate::quality::PeerSample;

    fn topology_config() -> TopologyConfig {
        TopologyConfig {
            election_interval: Duration::from_secs(30),
            min_uptime: Duration::from_secs(60),
            min_connections: 1,
            min_score: 0.5,
            super_peer_ratio: 0.5,
            max_super_peers_per_leaf: 3,
            max_leaf_peers_per_super: 3,
        }
    }

    fn good_monitor() -> PeerQualityMonitor {
        let monitor = PeerQualityMonitor::new(QualityConfig::default());
        monitor.record(
            NodeId::new(),
            PeerSample { rtt: Duration::ZERO, jitter: Duration::ZERO, loss: 0.0, samples: 10 },
        );
        monitor
    }

    #[test]
    fn stays_leaf_before_min_uptime() {
        let manager = TopologyManager::new(topology_config(), Instant::now());
        let monitor = good_monitor();
        let result = manager.elect(&monitor, 10, 0, Instant::now());
        assert_eq!(result.role, Role::Leaf);
    }

    #[test]
    fn promotes_to_super_once_eligible_and_under_target() {
        let started = Instant::now() - Duration::from_secs(120);
        let manager = TopologyManager::new(topology_config(), started);
        let monitor = good_monitor();
        let result = manager.elect(&monitor, 10, 0, Instant::now());
        assert_eq!(result.role, Role::Super);
    }

    #[test]
    fn demotes_when_super_peer_count_exceeds_target() {
        let started = Instant::now() - Duration::from_secs(120);
        let manager = TopologyManager::new(topology_config(), started);
        let monitor = good_monitor();
        manager.elect(&monitor, 10, 0, Instant::now());
        assert_eq!(manager.role(), Role::Super);

        let result = manager.elect(&monitor, 10, 100, Instant::now());
        assert_eq!(result.role, Role::Leaf);
    }
}

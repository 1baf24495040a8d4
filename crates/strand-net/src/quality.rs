//! Peer-Quality Monitor (spec §4.7): weighted score from RTT, jitter, loss,
//! and sample count, each saturating linearly into `[0, 1]`.

use crate::config::QualityConfig;
use std::collections::HashMap;
use std::time::Duration;
use strand_core::identifiers::NodeId;

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy)]
pub struct PeerSample {
    pub rtt: Duration,
    pub jitter: Duration,
    pub loss: f64,
    pub samples: u32,
}

/// `0.4*rtt_score + 0.3*variance_score + 0.2*loss_score + 0.1*samples_score`.
pub fn score(sample: PeerSample, config: &QualityConfig) -> f64 {
    let rtt_score = 1.0 - clamp01(sample.rtt.as_secs_f64() / 0.5);
    let variance_score = 1.0 - clamp01(sample.jitter.as_secs_f64() / 0.2);
    let loss_score = 1.0 - clamp01(sample.loss / 0.5);
    let samples_score = if sample.samples < config.min_samples { 0.5 } else { 1.0 };

    0.4 * rtt_score + 0.3 * variance_score + 0.2 * loss_score + 0.1 * samples_score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityClass {
    High,
    Normal,
    Low,
}

pub fn classify(score: f64, config: &QualityConfig) -> QualityClass {
    if score >= config.high_quality {
        QualityClass::High
    } else if score <= config.low_quality {
        QualityClass::Low
    } else {
        QualityClass::Normal
    }
}

/// Tracks the latest sample and derived score per peer.
pub struct PeerQualityMonitor {
    config: QualityConfig,
    peers: parking_lot::RwLock<HashMap<NodeId, PeerSample>>,
}

impl PeerQualityMonitor {
    pub fn new(config: QualityConfig) -> Self {
        Self {
            config,
            peers: parking_lot::RwLock::new(HashMap::new()),
        }
    }

    pub fn record(&self, node_id: NodeId, sample: PeerSample) {
        self.peers.write().insert(node_id, sample);
    }

    pub fn score_of(&self, node_id: NodeId) -> Option<f64> {
        self.peers.read().get(&node_id).map(|s| score(*s, &self.config))
    }

    pub fn class_of(&self, node_id: NodeId) -> Option<QualityClass> {
        self.score_of(node_id).map(|s| classify(s, &self.config))
    }

    /// Peers scoring at or above `HighQuality`, ranked best-first.
    pub fn super_peer_candidates(&self) -> Vec<(NodeId, f64)> {
        let mut scored: Vec<(NodeId, f64)> = self
            .peers
            .read()
            .iter()
            .map(|(id, sample)| (*id, score(*sample, &self.config)))
            .filter(|(_, s)| *s >= self.config.high_quality)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        scored
    }

    /// Peers scoring at or below `LowQuality`: prune candidates.
    pub fn prune_candidates(&self) -> Vec<NodeId> {
        self.peers
            .read()
            .iter()
            .filter(|(_, sample)| score(**sample, &self.config) <= self.config.low_quality)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn average_score(&self) -> f64 {
        let peers = self.peers.read();
        if peers.is_empty() {
            return 0.0;
        }
        let total: f64 = peers.values().map(|s| score(*s, &self.config)).sum();
        total / peers.len() as f64
    }

    pub fn connection_count(&self) -> usize {
        self.peers.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> QualityConfig {
        QualityConfig::default()
    }

    #[test]
    fn perfect_link_scores_one() {
        let sample = PeerSample {
            rtt: Duration::ZERO,
            jitter: Duration::ZERO,
            loss: 0.0,
            samples: 10,
        };
        assert!((score(sample, &config()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn saturated_bad_link_scores_near_the_floor() {
        let sample = PeerSample {
            rtt: Duration::from_secs(5),
            jitter: Duration::from_secs(5),
            loss: 1.0,
            samples: 10,
        };
        // rtt/variance/loss sub-scores all clamp to 0; only samples_score survives.
        assert!((score(sample, &config()) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn below_min_samples_uses_half_credit() {
        let sample = PeerSample {
            rtt: Duration::ZERO,
            jitter: Duration::ZERO,
            loss: 0.0,
            samples: 1,
        };
        assert!((score(sample, &config()) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn classify_respects_high_and_low_thresholds() {
        let cfg = config();
        assert_eq!(classify(0.9, &cfg), QualityClass::High);
        assert_eq!(classify(0.1, &cfg), QualityClass::Low);
        assert_eq!(classify(0.5, &cfg), QualityClass::Normal);
    }

    #[test]
    fn super_peer_candidates_are_sorted_best_first() {
        let monitor = PeerQualityMonitor::new(config());
        let good = NodeId::new();
        let great = NodeId::new();
        monitor.record(
            good,
            PeerSample { rtt: Duration::from_millis(50), jitter: Duration::ZERO, loss: 0.0, samples: 10 },
        );
        monitor.record(
            great,
            PeerSample { rtt: Duration::ZERO, jitter: Duration::ZERO, loss: 0.0, samples: 10 },
        );
        let candidates = monitor.super_peer_candidates();
        assert_eq!(candidates[0].0, great);
    }
}

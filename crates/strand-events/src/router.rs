//! Event Router + Interest Manager (spec §4.3).

use crate::channel::SubscriberChannel;
use crate::config::EventRouterConfig;
use crate::error::Result;
use crate::types::{Event, EventKind, Interest, InterestLevel, RouterStats};
use crate::wire::{EventWireMessage, TOPIC_EVENTS, TOPIC_INTEREST};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use strand_core::collab::Broadcast;
use strand_core::identifiers::{AgentId, EventId, NodeId};

struct Inner {
    subscribers: tokio::sync::RwLock<HashMap<AgentId, Arc<SubscriberChannel>>>,
    interests: tokio::sync::RwLock<HashMap<AgentId, Interest>>,
    remote_interests: tokio::sync::RwLock<HashMap<NodeId, Vec<Interest>>>,
    seen_events: tokio::sync::RwLock<HashMap<EventId, Instant>>,
    delivered: AtomicU64,
}

/// Glob-matched typed event dispatch: local subscriber fan-out plus remote
/// publish/receive with at-most-once-per-`event_id` delivery.
#[derive(Clone)]
pub struct EventRouter {
    config: EventRouterConfig,
    node_id: NodeId,
    broadcast: Arc<dyn Broadcast>,
    inner: Arc<Inner>,
}

impl EventRouter {
    pub fn new(config: EventRouterConfig, node_id: NodeId, broadcast: Arc<dyn Broadcast>) -> Self {
        Self {
            config,
            node_id,
            broadcast,
            inner: Arc::new(Inner {
                subscribers: tokio::sync::RwLock::new(HashMap::new()),
                interests: tokio::sync::RwLock::new(HashMap::new()),
                remote_interests: tokio::sync::RwLock::new(HashMap::new()),
                seen_events: tokio::sync::RwLock::new(HashMap::new()),
                delivered: AtomicU64::new(0),
            }),
        }
    }

    /// Registers `interest`, returning the subscriber's receive handle.
    /// Announces the change cluster-wide.
    pub async fn register(&self, interest: Interest) -> Arc<SubscriberChannel> {
        let agent_id = interest.agent_id;
        let channel = Arc::new(SubscriberChannel::new(self.config.channel_capacity));
        self.inner
            .subscribers
            .write()
            .await
            .insert(agent_id, channel.clone());
        self.inner
            .interests
            .write()
            .await
            .insert(agent_id, interest.clone());
        self.announce_interest_change(interest).await;
        channel
    }

    pub async fn unregister(&self, agent_id: AgentId) {
        self.inner.subscribers.write().await.remove(&agent_id);
        self.inner.interests.write().await.remove(&agent_id);
        self.announce_interest_change(Interest {
            agent_id,
            patterns: Vec::new(),
            level: InterestLevel::None,
        })
        .await;
    }

    async fn announce_interest_change(&self, interest: Interest) {
        let event = Event {
            event_id: EventId::new(),
            kind: EventKind::InterestChanged,
            source_id: self.node_id,
            file_path: None,
            mentions: vec![interest.agent_id],
            body: serde_json::to_value(&interest).unwrap_or(serde_json::Value::Null),
            timestamp: SystemTime::now(),
        };
        self.deliver_locally(&event).await;
        let broadcast = self.broadcast.clone();
        let bytes = strand_core::wire::encode(&EventWireMessage::InterestChanged(interest));
        tokio::spawn(async move {
            if let Err(e) = broadcast.broadcast(TOPIC_INTEREST, bytes).await {
                tracing::warn!(error = %e, "interest announcement failed");
            }
        });
    }

    /// Publishes a locally-originated event: delivers to matching local
    /// subscribers, then broadcasts to remote nodes (pruned to nodes whose
    /// last-known interests could plausibly match, an optimization only).
    pub async fn publish(&self, event: Event) -> Result<()> {
        self.inner
            .seen_events
            .write()
            .await
            .insert(event.event_id, Instant::now());
        self.deliver_locally(&event).await;

        if self.any_remote_interest_could_match(&event).await {
            let broadcast = self.broadcast.clone();
            let bytes = strand_core::wire::encode(&EventWireMessage::Event(event));
            tokio::spawn(async move {
                if let Err(e) = broadcast.broadcast(TOPIC_EVENTS, bytes).await {
                    tracing::warn!(error = %e, "event broadcast failed");
                }
            });
        }
        Ok(())
    }

    /// Ingests an event arriving from the P2P layer: delivered to local
    /// subscribers exactly once per `event_id`.
    pub async fn on_remote_event(&self, event: Event) {
        {
            let mut seen = self.inner.seen_events.write().await;
            if seen.contains_key(&event.event_id) {
                return;
            }
            seen.insert(event.event_id, Instant::now());
        }
        self.deliver_locally(&event).await;
    }

    pub async fn on_remote_interest_changed(&self, node_id: NodeId, interest: Interest) {
        let mut remote = self.inner.remote_interests.write().await;
        let interests = remote.entry(node_id).or_default();
        interests.retain(|i| i.agent_id != interest.agent_id);
        if interest.level != InterestLevel::None {
            interests.push(interest);
        }
    }

    pub async fn stats(&self) -> RouterStats {
        let subscribers = self.inner.subscribers.read().await;
        let mut dropped = 0;
        for channel in subscribers.values() {
            dropped += channel.dropped();
        }
        RouterStats {
            delivered: self.inner.delivered.load(Ordering::Relaxed),
            dropped,
        }
    }

    /// Background dedup-set pruner: entries older than `dedup_window` are
    /// forgotten so the map does not grow unbounded.
    pub async fn run(self, cancel: tokio_util::sync::CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.dedup_window);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("event dedup pruner shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    self.prune_seen_events().await;
                }
            }
        }
    }

    async fn prune_seen_events(&self) {
        let window = self.config.dedup_window;
        let now = Instant::now();
        self.inner
            .seen_events
            .write()
            .await
            .retain(|_, seen_at| now.duration_since(*seen_at) < window);
    }

    async fn deliver_locally(&self, event: &Event) {
        let interests = self.inner.interests.read().await;
        let subscribers = self.inner.subscribers.read().await;
        for (agent_id, interest) in interests.iter() {
            if !interest.matches(event) {
                continue;
            }
            if let Some(channel) = subscribers.get(agent_id) {
                channel.push(event.clone()).await;
                self.inner.delivered.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    async fn any_remote_interest_could_match(&self, event: &Event) -> bool {
        let remote = self.inner.remote_interests.read().await;
        if remote.is_empty() {
            // No interest information gathered yet; publish rather than
            // silently drop (pruning is an optimization, not a guarantee).
            return true;
        }
        remote
            .values()
            .any(|interests| interests.iter().any(|i| i.matches(event)))
    }
}

//! Pub/Sub Node (spec §4.4 "Node contract"): topic fan-out with self-echo
//! suppression, FIFO-per-topic delivery, and at-most-once dedup by message
//! id. The hub stands in for the underlying transport, which core does not
//! own (spec §6 "transport layer").

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use strand_core::collab::Broadcast;
use strand_core::identifiers::NodeId;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PubSubMessage {
    pub message_id: Uuid,
    pub sender: NodeId,
    pub bytes: Vec<u8>,
}

/// Bounded per-subscriber queue; drop-oldest on full (spec §5 backpressure
/// policy applies uniformly across bus components).
pub struct TopicQueue {
    capacity: usize,
    queue: tokio::sync::Mutex<VecDeque<PubSubMessage>>,
    notify: tokio::sync::Notify,
    dropped: AtomicU64,
}

impl TopicQueue {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: tokio::sync::Mutex::new(VecDeque::with_capacity(capacity)),
            notify: tokio::sync::Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    async fn push(&self, msg: PubSubMessage) {
        let mut queue = self.queue.lock().await;
        if queue.len() >= self.capacity {
            queue.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(msg);
        drop(queue);
        self.notify.notify_one();
    }

    pub async fn next(&self) -> PubSubMessage {
        loop {
            let notified = self.notify.notified();
            {
                let mut queue = self.queue.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return msg;
                }
            }
            notified.await;
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

type TopicSubscribers = HashMap<String, Vec<(NodeId, Arc<TopicQueue>)>>;

struct HubInner {
    subscribers: tokio::sync::RwLock<TopicSubscribers>,
    seen: tokio::sync::Mutex<HashMap<Uuid, Instant>>,
}

/// Shared fan-out point for every node's [`PubSubNode`] handle.
#[derive(Clone)]
pub struct PubSubHub {
    queue_capacity: usize,
    dedup_window: Duration,
    inner: Arc<HubInner>,
}

impl PubSubHub {
    pub fn new(queue_capacity: usize, dedup_window: Duration) -> Self {
        Self {
            queue_capacity,
            dedup_window,
            inner: Arc::new(HubInner {
                subscribers: tokio::sync::RwLock::new(HashMap::new()),
                seen: tokio::sync::Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn node(&self, node_id: NodeId) -> PubSubNode {
        PubSubNode {
            node_id,
            hub: self.clone(),
        }
    }

    pub async fn subscribe(&self, node_id: NodeId, topic: impl Into<String>) -> Arc<TopicQueue> {
        let queue = Arc::new(TopicQueue::new(self.queue_capacity));
        self.inner
            .subscribers
            .write()
            .await
            .entry(topic.into())
            .or_default()
            .push((node_id, queue.clone()));
        queue
    }

    /// Delivers `bytes` under a fresh message id to every subscriber of
    /// `topic` except `sender` itself. A topic-scoped read lock serializes
    /// fan-out, which gives FIFO delivery per sender as a side effect.
    async fn publish(&self, sender: NodeId, topic: &str, bytes: Vec<u8>) {
        let message_id = Uuid::new_v4();
        {
            let mut seen = self.inner.seen.lock().await;
            let now = Instant::now();
            seen.retain(|_, at| now.duration_since(*at) < self.dedup_window);
            seen.insert(message_id, now);
        }

        let subscribers = self.inner.subscribers.read().await;
        let Some(subs) = subscribers.get(topic) else {
            return;
        };
        for (subscriber_id, queue) in subs {
            if *subscriber_id == sender {
                continue;
            }
            queue
                .push(PubSubMessage {
                    message_id,
                    sender,
                    bytes: bytes.clone(),
                })
                .await;
        }
    }
}

/// A single node's handle onto the shared hub.
#[derive(Clone)]
pub struct PubSubNode {
    node_id: NodeId,
    hub: PubSubHub,
}

impl PubSubNode {
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub async fn subscribe(&self, topic: impl Into<String>) -> Arc<TopicQueue> {
        self.hub.subscribe(self.node_id, topic).await
    }

    pub async fn publish(&self, topic: &str, bytes: Vec<u8>) {
        self.hub.publish(self.node_id, topic, bytes).await;
    }
}

/// Lets `PubSubNode` serve directly as the injected [`Broadcast`]
/// collaborator for the Lock Service, Context Sync Manager, and Event
/// Router.
#[async_trait]
impl Broadcast for PubSubNode {
    async fn broadcast(&self, topic: &str, bytes: Vec<u8>) -> strand_core::Result<()> {
        self.publish(topic, bytes).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn self_echo_is_suppressed() {
        let hub = PubSubHub::new(16, Duration::from_secs(1));
        let a = hub.node(NodeId::new());
        let queue = a.subscribe("topic").await;
        a.publish("topic", b"hi".to_vec()).await;

        let result =
            tokio::time::timeout(Duration::from_millis(20), queue.next()).await;
        assert!(result.is_err(), "sender must not receive its own publish");
    }

    #[tokio::test]
    async fn fifo_per_sender_within_a_topic() {
        let hub = PubSubHub::new(16, Duration::from_secs(1));
        let a = hub.node(NodeId::new());
        let b = hub.node(NodeId::new());
        let queue = b.subscribe("topic").await;

        a.publish("topic", b"1".to_vec()).await;
        a.publish("topic", b"2".to_vec()).await;
        a.publish("topic", b"3".to_vec()).await;

        assert_eq!(queue.next().await.bytes, b"1");
        assert_eq!(queue.next().await.bytes, b"2");
        assert_eq!(queue.next().await.bytes, b"3");
    }

    #[tokio::test]
    async fn full_queue_drops_oldest() {
        let hub = PubSubHub::new(2, Duration::from_secs(1));
        let a = hub.node(NodeId::new());
        let b = hub.node(NodeId::new());
        let queue = b.subscribe("topic").await;

        a.publish("topic", b"1".to_vec()).await;
        a.publish("topic", b"2".to_vec()).await;
        a.publish("topic", b"3".to_vec()).await;

        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.next().await.bytes, b"2");
        assert_eq!(queue.next().await.bytes, b"3");
    }
}

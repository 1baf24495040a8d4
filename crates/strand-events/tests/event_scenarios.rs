//! End-to-end scenarios from spec §8.

use std::sync::Arc;
use std::time::SystemTime;
use strand_core::collab::test_support::NullBroadcast;
use strand_core::identifiers::{AgentId, EventId, NodeId};
use strand_events::{Event, EventKind, EventRouter, EventRouterConfig, Interest, InterestLevel};

fn router(node_id: NodeId) -> EventRouter {
    EventRouter::new(EventRouterConfig::default(), node_id, Arc::new(NullBroadcast))
}

fn event(kind: EventKind, file_path: Option<&str>, source: NodeId) -> Event {
    Event {
        event_id: EventId::new(),
        kind,
        source_id: source,
        file_path: file_path.map(String::from),
        mentions: Vec::new(),
        body: serde_json::Value::Null,
        timestamp: SystemTime::now(),
    }
}

#[tokio::test]
async fn interest_filter_delivers_exactly_once_on_a_matching_path() {
    let r = router(NodeId::new());
    let channel = r
        .register(Interest {
            agent_id: AgentId::new(),
            patterns: vec!["src/**/*.go".into()],
            level: InterestLevel::All,
        })
        .await;
    channel.recv().await; // drain the InterestChanged self-announcement

    r.publish(event(EventKind::FileChange, Some("src/core/x.go"), NodeId::new()))
        .await
        .unwrap();
    r.publish(event(EventKind::FileChange, Some("docs/y.md"), NodeId::new()))
        .await
        .unwrap();

    let delivered = channel.recv().await;
    assert_eq!(delivered.file_path.as_deref(), Some("src/core/x.go"));
    assert_eq!(r.stats().await.dropped, 0);
}

#[tokio::test]
async fn none_level_subscriber_receives_nothing() {
    let r = router(NodeId::new());
    let channel = r
        .register(Interest {
            agent_id: AgentId::new(),
            patterns: vec!["**".into()],
            level: InterestLevel::None,
        })
        .await;

    r.publish(event(EventKind::AgentJoined, None, NodeId::new()))
        .await
        .unwrap();

    // Only the registration's own InterestChanged broadcast can ever land
    // here, and it never does because this subscriber's own level is None.
    tokio::time::timeout(std::time::Duration::from_millis(20), channel.recv())
        .await
        .expect_err("a None-level interest should never receive an event");
}

#[tokio::test]
async fn full_subscriber_channel_drops_oldest_without_blocking_the_publisher() {
    let config = EventRouterConfig {
        channel_capacity: 2,
        ..EventRouterConfig::default()
    };
    let r = EventRouter::new(config, NodeId::new(), Arc::new(NullBroadcast));
    let _channel = r
        .register(Interest {
            agent_id: AgentId::new(),
            patterns: Vec::new(),
            level: InterestLevel::All,
        })
        .await;

    for _ in 0..5 {
        r.publish(event(EventKind::AgentJoined, None, NodeId::new()))
            .await
            .unwrap();
    }

    assert!(r.stats().await.dropped > 0);
}

#[tokio::test]
async fn unregister_stops_delivery() {
    let r = router(NodeId::new());
    let agent_id = AgentId::new();
    let channel = r
        .register(Interest {
            agent_id,
            patterns: Vec::new(),
            level: InterestLevel::All,
        })
        .await;
    channel.recv().await;

    r.unregister(agent_id).await;
    r.publish(event(EventKind::AgentLeft, None, NodeId::new()))
        .await
        .unwrap();

    tokio::time::timeout(std::time::Duration::from_millis(20), channel.recv())
        .await
        .expect_err("an unregistered agent must not receive further events");
}

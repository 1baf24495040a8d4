//! End-to-end scenarios from spec §8.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strand_core::collab::test_support::{NullBroadcast, NullEmbed, NullVectorStore};
use strand_core::identifiers::{DeltaId, NodeId};
use strand_core::VectorClock;
use strand_sync::{ContextSyncManager, Delta, DeltaPayload, DeltaType, FileDiff};

fn manager(node_id: NodeId) -> ContextSyncManager {
    ContextSyncManager::new(
        node_id,
        Arc::new(NullBroadcast),
        Arc::new(NullEmbed),
        Arc::new(NullVectorStore),
    )
}

fn delta(source: NodeId, clock: VectorClock, file_path: &str) -> Delta {
    Delta {
        delta_id: DeltaId::new(),
        source_id: source,
        source_name: "agent".into(),
        vector_clock: clock,
        delta_type: DeltaType::FileChange,
        payload: DeltaPayload {
            file_path: Some(file_path.into()),
            file_diff: FileDiff::default(),
        },
        timestamp: std::time::SystemTime::now(),
    }
}

#[tokio::test]
async fn causal_deltas_from_one_source_never_conflict_out_of_order() {
    let a = NodeId::new();
    let conflicts = Arc::new(AtomicUsize::new(0));
    let counter = conflicts.clone();

    let b = manager(NodeId::new());
    b.set_conflict_handler(Arc::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }))
    .await;

    let mut vc1 = VectorClock::new();
    vc1.advance(a);
    let mut vc2 = vc1.clone();
    vc2.advance(a);

    let d1 = delta(a, vc1, "path");
    let d2 = delta(a, vc2.clone(), "path");

    // B receives out of causal order: Δ2 then Δ1.
    b.receive_delta(d2).await.unwrap();
    b.receive_delta(d1).await.unwrap();

    assert_eq!(conflicts.load(Ordering::SeqCst), 0);
    assert_eq!(b.log().await.len(), 2);
}

#[tokio::test]
async fn independent_concurrent_edits_are_flagged_and_both_retained() {
    let node_a = NodeId::new();
    let node_b = NodeId::new();

    let conflicts = Arc::new(AtomicUsize::new(0));
    let counter = conflicts.clone();
    let mgr = manager(node_a);
    mgr.set_conflict_handler(Arc::new(move |notice| {
        assert_eq!(notice.file_path, "p");
        counter.fetch_add(1, Ordering::SeqCst);
    }))
    .await;

    // A produces its own delta for "p" locally — applied without conflict.
    mgr.produce_delta(
        "agent-a",
        DeltaType::FileChange,
        DeltaPayload {
            file_path: Some("p".into()),
            file_diff: FileDiff::default(),
        },
    )
    .await
    .unwrap();
    assert_eq!(conflicts.load(Ordering::SeqCst), 0);

    // B's independent delta for the same file arrives — concurrent.
    let mut vc_b = VectorClock::new();
    vc_b.advance(node_b);
    mgr.receive_delta(delta(node_b, vc_b, "p")).await.unwrap();

    assert_eq!(conflicts.load(Ordering::SeqCst), 1);
    assert_eq!(mgr.log().await.len(), 2, "both deltas are retained");
}

#[tokio::test]
async fn duplicate_delta_id_is_applied_once() {
    let mgr = manager(NodeId::new());
    let source = NodeId::new();
    let mut vc = VectorClock::new();
    vc.advance(source);
    let d = delta(source, vc, "dup.rs");

    mgr.receive_delta(d.clone()).await.unwrap();
    mgr.receive_delta(d).await.unwrap();

    assert_eq!(mgr.log().await.len(), 1);
}

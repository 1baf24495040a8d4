//! End-to-end scenarios from spec §8.

use std::sync::Arc;
use std::time::Duration;
use strand_core::collab::test_support::NullBroadcast;
use strand_core::identifiers::NodeId;
use strand_lock::{LockConfig, LockService, LockTarget};

fn service() -> LockService {
    LockService::new(
        LockConfig {
            announce_window: Duration::from_millis(20),
            reap_interval: Duration::from_millis(10),
        },
        NodeId::new(),
        Arc::new(NullBroadcast),
    )
}

#[tokio::test]
async fn overlapping_acquire_against_held_lock_conflicts() {
    let svc = service();
    let a = svc
        .acquire("agent-a", LockTarget::new("x.go", 10, 20), "edit", Duration::from_secs(5))
        .await
        .expect("first acquire should succeed");

    let err = svc
        .acquire("agent-b", LockTarget::new("x.go", 15, 25), "edit", Duration::from_secs(5))
        .await
        .expect_err("overlapping acquire must conflict");

    match err {
        strand_lock::LockError::Conflict {
            conflicting_lock: Some(held),
        } => assert_eq!(held.id, a),
        other => panic!("expected conflict with the held lock, got {other:?}"),
    }

    assert_eq!(svc.list_locks().await.len(), 1);
}

#[tokio::test]
async fn disjoint_ranges_do_not_conflict() {
    let svc = service();
    svc.acquire("a", LockTarget::new("x.go", 1, 5), "edit", Duration::from_secs(5))
        .await
        .unwrap();
    svc.acquire("a", LockTarget::new("x.go", 6, 10), "edit", Duration::from_secs(5))
        .await
        .expect("disjoint ranges on the same file must not conflict");
    assert_eq!(svc.list_locks().await.len(), 2);
}

#[tokio::test]
async fn expiry_releases_the_lock_and_frees_the_target() {
    let svc = service();
    let cancel = tokio_util::sync::CancellationToken::new();
    tokio::spawn(svc.clone().run(cancel.clone()));

    svc.acquire("a", LockTarget::new("y.go", 1, 5), "edit", Duration::from_millis(30))
        .await
        .unwrap();
    assert_eq!(svc.list_locks().await.len(), 1);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(svc.list_locks().await.is_empty());

    // Same target is acquirable again now that the lock has expired.
    svc.acquire("a", LockTarget::new("y.go", 1, 5), "edit", Duration::from_secs(5))
        .await
        .expect("target must be free after expiry");

    cancel.cancel();
}

#[tokio::test]
async fn release_by_non_holder_is_rejected() {
    let svc = service();
    let lock_id = svc
        .acquire("a", LockTarget::new("z.go", 1, 5), "edit", Duration::from_secs(5))
        .await
        .unwrap();

    let other = LockService::new(
        LockConfig::default(),
        NodeId::new(),
        Arc::new(NullBroadcast),
    );
    // `other` never saw this lock locally, so it reports not-found, not not-owner.
    assert!(matches!(
        other.release(lock_id).await,
        Err(strand_lock::LockError::NotFound)
    ));
}

#[tokio::test]
async fn remote_acquired_conflict_resolves_deterministically_and_notifies() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let svc = service();
    let notified = Arc::new(AtomicBool::new(false));
    let notified2 = notified.clone();
    svc.set_event_handler(Arc::new(move |event| {
        if matches!(event, strand_lock::LockEvent::Conflict { .. }) {
            notified2.store(true, Ordering::SeqCst);
        }
    }))
    .await;

    let local_id = svc
        .acquire("local", LockTarget::new("w.go", 1, 10), "edit", Duration::from_secs(30))
        .await
        .unwrap();

    let mut remote = svc.list_locks().await.remove(0);
    remote.id = strand_core::identifiers::LockId::new();
    remote.holder_id = NodeId::new();
    // Earlier acquired_at always wins arbitration against the local lock.
    remote.acquired_at = std::time::SystemTime::UNIX_EPOCH;

    svc.on_remote_acquired(remote.clone()).await;

    let held = svc.list_locks().await;
    assert!(held.iter().any(|l| l.id == remote.id));
    assert!(!held.iter().any(|l| l.id == local_id));
    assert!(notified.load(Ordering::SeqCst));
}

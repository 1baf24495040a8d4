//! Lock Service: the three-phase advisory-lock protocol of spec §4.1.

use crate::config::LockConfig;
use crate::error::{LockError, Result};
use crate::types::{LockIntent, LockState, LockTarget, SemanticLock};
use crate::wire::{LockWireMessage, TOPIC_ACQUIRE, TOPIC_INTENT, TOPIC_RELEASE};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use strand_core::collab::Broadcast;
use strand_core::identifiers::{IntentId, LockId, NodeId};

/// Event surfaced to a caller-installed handler: a remote lock that collided
/// with one we held, or a local lock whose TTL lapsed.
#[derive(Debug, Clone)]
pub enum LockEvent {
    Conflict {
        local_lock_id: LockId,
        conflicting: SemanticLock,
    },
    Expired {
        lock_id: LockId,
    },
}

pub type LockEventHandler = Arc<dyn Fn(LockEvent) + Send + Sync>;

struct Inner {
    locks: tokio::sync::RwLock<HashMap<LockId, SemanticLock>>,
    pending_intents: tokio::sync::RwLock<HashMap<String, Vec<LockIntent>>>,
    event_handler: tokio::sync::RwLock<Option<LockEventHandler>>,
}

/// Advisory-lock engine over overlapping `(file, line-range)` targets.
#[derive(Clone)]
pub struct LockService {
    config: LockConfig,
    node_id: NodeId,
    broadcast: Arc<dyn Broadcast>,
    inner: Arc<Inner>,
}

impl LockService {
    pub fn new(config: LockConfig, node_id: NodeId, broadcast: Arc<dyn Broadcast>) -> Self {
        Self {
            config,
            node_id,
            broadcast,
            inner: Arc::new(Inner {
                locks: tokio::sync::RwLock::new(HashMap::new()),
                pending_intents: tokio::sync::RwLock::new(HashMap::new()),
                event_handler: tokio::sync::RwLock::new(None),
            }),
        }
    }

    pub async fn set_event_handler(&self, handler: LockEventHandler) {
        *self.inner.event_handler.write().await = Some(handler);
    }

    fn publish(&self, topic: &'static str, msg: LockWireMessage) {
        let broadcast = self.broadcast.clone();
        let bytes = strand_core::wire::encode(&msg);
        tokio::spawn(async move {
            if let Err(e) = broadcast.broadcast(topic, bytes).await {
                tracing::warn!(topic, error = %e, "lock broadcast failed; self-healing via snapshot exchange");
            }
        });
    }

    /// Phase 1-3: announce intent, wait out conflicts, commit or fail.
    pub async fn acquire(
        &self,
        holder_name: impl Into<String>,
        target: LockTarget,
        intention: impl Into<String>,
        ttl: Duration,
    ) -> Result<LockId> {
        let holder_name = holder_name.into();
        let lock_id = LockId::new();
        let now = SystemTime::now();
        let intent = LockIntent {
            intent_id: IntentId::new(),
            lock_id,
            target: target.clone(),
            holder_id: self.node_id,
            declared_at: now,
            deadline: now + self.config.announce_window,
        };

        {
            let mut pending = self.inner.pending_intents.write().await;
            pending
                .entry(target.file_path.clone())
                .or_default()
                .push(intent.clone());
        }
        self.publish(TOPIC_INTENT, LockWireMessage::Intent(intent.clone()));

        // Step 2: conflict wait.
        tokio::time::sleep(self.config.announce_window).await;

        if let Some(held) = self.find_overlapping_held(&target).await {
            self.forget_intent(&target.file_path, intent.intent_id).await;
            return Err(LockError::Conflict {
                conflicting_lock: Some(Box::new(held)),
            });
        }

        if !self.wins_arbitration(&target, &intent).await {
            self.forget_intent(&target.file_path, intent.intent_id).await;
            return Err(LockError::Conflict {
                conflicting_lock: None,
            });
        }

        self.forget_intent(&target.file_path, intent.intent_id).await;

        // Step 3: commit.
        let lock = SemanticLock {
            id: lock_id,
            holder_id: self.node_id,
            holder_name,
            target,
            intention: intention.into(),
            acquired_at: now,
            expires_at: now + ttl,
            state: LockState::Held,
        };
        self.inner
            .locks
            .write()
            .await
            .insert(lock_id, lock.clone());
        self.publish(TOPIC_ACQUIRE, LockWireMessage::Acquired(lock));
        Ok(lock_id)
    }

    pub async fn release(&self, lock_id: LockId) -> Result<()> {
        let mut locks = self.inner.locks.write().await;
        match locks.get(&lock_id) {
            None => Err(LockError::NotFound),
            Some(lock) if lock.holder_id != self.node_id => Err(LockError::NotOwner),
            Some(_) => {
                locks.remove(&lock_id);
                drop(locks);
                self.publish(TOPIC_RELEASE, LockWireMessage::Released { lock_id });
                Ok(())
            }
        }
    }

    pub async fn list_locks(&self) -> Vec<SemanticLock> {
        self.inner
            .locks
            .read()
            .await
            .values()
            .filter(|l| l.state == LockState::Held)
            .cloned()
            .collect()
    }

    /// Remote peer announced an intent; register it so local arbitration sees it.
    pub async fn on_remote_intent(&self, intent: LockIntent) {
        let mut pending = self.inner.pending_intents.write().await;
        pending
            .entry(intent.target.file_path.clone())
            .or_default()
            .push(intent);
    }

    /// Remote peer committed a lock. Detect conflicts against our own Held
    /// locks (only reachable via partition merge) and resolve deterministically.
    pub async fn on_remote_acquired(&self, remote: SemanticLock) {
        let mut local_losers = Vec::new();
        {
            let locks = self.inner.locks.read().await;
            for lock in locks.values() {
                if lock.holder_id == self.node_id
                    && lock.state == LockState::Held
                    && lock.target.overlaps(&remote.target)
                    && lock.id != remote.id
                    && arbitration_winner(lock, &remote) == Winner::Other
                {
                    local_losers.push(lock.id);
                }
            }
        }

        let mut locks = self.inner.locks.write().await;
        for loser in &local_losers {
            if let Some(lock) = locks.get_mut(loser) {
                lock.state = LockState::Released;
            }
        }
        locks.insert(remote.id, remote.clone());
        drop(locks);

        if let Some(handler) = self.inner.event_handler.read().await.clone() {
            for loser in local_losers {
                handler(LockEvent::Conflict {
                    local_lock_id: loser,
                    conflicting: remote.clone(),
                });
            }
        }
    }

    pub async fn on_remote_released(&self, lock_id: LockId) {
        self.inner.locks.write().await.remove(&lock_id);
    }

    /// Background reaper: scans every `reap_interval`, expiring and
    /// releasing any lock whose TTL has lapsed (spec §4.1 "Expiry").
    pub async fn run(self, cancel: tokio_util::sync::CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.reap_interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("lock reaper shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    self.reap_expired().await;
                }
            }
        }
    }

    async fn reap_expired(&self) {
        let now = SystemTime::now();
        let expired: Vec<LockId> = {
            let locks = self.inner.locks.read().await;
            locks
                .values()
                .filter(|l| l.state == LockState::Held && l.is_expired_at(now))
                .map(|l| l.id)
                .collect()
        };
        for lock_id in expired {
            let mut locks = self.inner.locks.write().await;
            if let Some(lock) = locks.get_mut(&lock_id) {
                lock.state = LockState::Expired;
            }
            locks.remove(&lock_id);
            drop(locks);
            self.publish(TOPIC_RELEASE, LockWireMessage::Released { lock_id });
            if let Some(handler) = self.inner.event_handler.read().await.clone() {
                handler(LockEvent::Expired { lock_id });
            }
        }
        self.prune_expired_intents(now).await;
    }

    /// A remote intent only ever leaves `pending_intents` via the local
    /// node's own `forget_intent` calls, which run solely inside the flow
    /// that registered the intent in the first place (spec §4.1 step 1-3).
    /// An intent announced by another node and never locally resolved would
    /// otherwise sit there past its `deadline` forever, permanently biasing
    /// arbitration. Run on the same tick as lock expiry.
    async fn prune_expired_intents(&self, now: SystemTime) {
        let mut pending = self.inner.pending_intents.write().await;
        for intents in pending.values_mut() {
            intents.retain(|intent| intent.deadline > now);
        }
        pending.retain(|_, intents| !intents.is_empty());
    }

    async fn find_overlapping_held(&self, target: &LockTarget) -> Option<SemanticLock> {
        self.inner
            .locks
            .read()
            .await
            .values()
            .find(|l| l.state == LockState::Held && l.target.overlaps(target))
            .cloned()
    }

    /// Winning intent is the lowest `(declared_at, holder_id)` among every
    /// intent overlapping `target`, including our own.
    async fn wins_arbitration(&self, target: &LockTarget, mine: &LockIntent) -> bool {
        let pending = self.inner.pending_intents.read().await;
        let candidates = pending.get(&target.file_path);
        let Some(candidates) = candidates else {
            return true;
        };
        let best = candidates
            .iter()
            .filter(|i| i.target.overlaps(target))
            .min_by_key(|i| i.arbitration_key());
        match best {
            Some(winner) => winner.intent_id == mine.intent_id,
            None => true,
        }
    }

    async fn forget_intent(&self, file_path: &str, intent_id: IntentId) {
        let mut pending = self.inner.pending_intents.write().await;
        if let Some(list) = pending.get_mut(file_path) {
            list.retain(|i| i.intent_id != intent_id);
        }
    }
}

#[derive(PartialEq, Eq)]
enum Winner {
    SelfLock,
    Other,
}

/// Same lexicographic rule as intent arbitration, applied to `acquired_at`
/// + holder id for resolving two concurrently-Held overlapping locks.
fn arbitration_winner(local: &SemanticLock, remote: &SemanticLock) -> Winner {
    let local_key = (local.acquired_at, local.holder_id.to_string());
    let remote_key = (remote.acquired_at, remote.holder_id.to_string());
    if local_key <= remote_key {
        Winner::SelfLock
    } else {
        Winner::Other
    }
}

//! Message Batcher (spec §4.4 "Batcher"): accumulates per-topic until
//! `MaxCount`, `MaxBytes`, or `MaxDelay` closes the batch, whichever first.

use crate::error::{NetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

use crate::config::BatchConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchEnvelope {
    #[serde(rename = "batch")]
    Batch { count: usize, messages: Vec<Vec<u8>> },
}

/// Deserializes a raw frame as a batch if tagged `"batch"`, else wraps it as
/// a single-element array (spec §8 round-trip law `Unbatch(Batch(ms)) ==
/// ms`, and the "non-batch passthrough" fallback). A batch nested inside a
/// batch is rejected as `CORRUPTED` — nesting is unspecified upstream and
/// the chosen contract here is non-nested only.
pub fn unbatch(bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    match serde_json::from_slice::<BatchEnvelope>(bytes) {
        Ok(BatchEnvelope::Batch { messages, .. }) => {
            for message in &messages {
                if is_batch_frame(message) {
                    return Err(NetError::Corrupted("nested batch frame".into()));
                }
            }
            Ok(messages)
        }
        Err(_) => Ok(vec![bytes.to_vec()]),
    }
}

fn is_batch_frame(bytes: &[u8]) -> bool {
    matches!(
        serde_json::from_slice::<BatchEnvelope>(bytes),
        Ok(BatchEnvelope::Batch { .. })
    )
}

struct PendingBatch {
    messages: Vec<Vec<u8>>,
    bytes: usize,
    opened_at: Instant,
}

impl PendingBatch {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            bytes: 0,
            opened_at: Instant::now(),
        }
    }
}

/// Per-topic accumulator. The spec requires the lock to be released across
/// publisher calls, so [`Batcher::add`] returns a completed batch (if any)
/// for the caller to publish *after* dropping the guard, rather than
/// publishing from inside the locked section itself.
pub struct Batcher {
    config: BatchConfig,
    topics: parking_lot::Mutex<HashMap<String, PendingBatch>>,
}

impl Batcher {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            topics: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Adds `message` to `topic`'s pending batch. Returns `Some(batch)` if
    /// this insertion closed the batch (count/bytes limit reached); the
    /// delay limit is enforced separately via [`Batcher::flush_expired`].
    pub fn add(&self, topic: &str, message: Vec<u8>) -> Option<Vec<Vec<u8>>> {
        let mut topics = self.topics.lock();
        let pending = topics.entry(topic.to_string()).or_insert_with(PendingBatch::new);
        pending.bytes += message.len();
        pending.messages.push(message);

        if pending.messages.len() >= self.config.max_count || pending.bytes >= self.config.max_bytes {
            let closed = topics.remove(topic).unwrap();
            return Some(closed.messages);
        }
        None
    }

    /// Closes and returns every pending batch whose `MaxDelay` has elapsed.
    /// Intended to be polled by the owning subsystem's worker task.
    pub fn flush_expired(&self) -> Vec<(String, Vec<Vec<u8>>)> {
        let mut topics = self.topics.lock();
        let now = Instant::now();
        let expired: Vec<String> = topics
            .iter()
            .filter(|(_, pending)| now.duration_since(pending.opened_at) >= self.config.max_delay)
            .map(|(topic, _)| topic.clone())
            .collect();
        expired
            .into_iter()
            .map(|topic| {
                let pending = topics.remove(&topic).unwrap();
                (topic, pending.messages)
            })
            .collect()
    }

    /// Closes and returns every pending batch regardless of delay — used on
    /// shutdown to drain pending work (spec §5 "workers drain buffers on
    /// shutdown").
    pub fn flush_all(&self) -> Vec<(String, Vec<Vec<u8>>)> {
        let mut topics = self.topics.lock();
        topics
            .drain()
            .map(|(topic, pending)| (topic, pending.messages))
            .collect()
    }

    pub fn encode(topic_messages: Vec<Vec<u8>>) -> Vec<u8> {
        let envelope = BatchEnvelope::Batch {
            count: topic_messages.len(),
            messages: topic_messages,
        };
        serde_json::to_vec(&envelope).expect("batch envelope is always serializable")
    }
}

//! Per-subscriber bounded delivery queue with drop-oldest-on-full semantics
//! (spec §4.3 "Delivery model": "never block producers").

use crate::types::Event;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, Notify};

pub struct SubscriberChannel {
    capacity: usize,
    queue: Mutex<VecDeque<Event>>,
    notify: Notify,
    dropped: AtomicU64,
}

impl SubscriberChannel {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Pushes `event`, dropping the oldest queued entry if at capacity.
    /// Returns true if an entry was dropped to make room.
    pub async fn push(&self, event: Event) -> bool {
        let mut queue = self.queue.lock().await;
        let dropped = if queue.len() >= self.capacity {
            queue.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        };
        queue.push_back(event);
        drop(queue);
        self.notify.notify_one();
        dropped
    }

    /// Awaits the next event. Returns `None` only if the channel is closed
    /// by dropping every handle — callers hold an `Arc`, so in practice this
    /// call simply waits for the next `push`.
    pub async fn recv(&self) -> Event {
        loop {
            let notified = self.notify.notified();
            {
                let mut queue = self.queue.lock().await;
                if let Some(event) = queue.pop_front() {
                    return event;
                }
            }
            notified.await;
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

use std::time::Duration;

/// Router tuning (spec §4.3 "Delivery model").
#[derive(Debug, Clone)]
pub struct EventRouterConfig {
    /// Per-subscriber bounded channel capacity; oldest entry drops on full.
    pub channel_capacity: usize,
    /// How long a remote `event_id` is remembered for dedup before pruning.
    pub dedup_window: Duration,
}

impl Default for EventRouterConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            dedup_window: Duration::from_secs(60),
        }
    }
}

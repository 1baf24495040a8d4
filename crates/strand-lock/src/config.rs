use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Window during which conflicting intents are collected before committing.
    pub announce_window: Duration,
    /// Interval at which the background reaper scans for expired locks.
    pub reap_interval: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            announce_window: Duration::from_millis(250),
            reap_interval: Duration::from_secs(1),
        }
    }
}

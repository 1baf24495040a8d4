//! Tracing initialization for the composed daemon. Respects `RUST_LOG`,
//! defaulting to `info` (mirrors the teacher's `tracing_subscriber::fmt::init`,
//! extended with an env filter since this crate runs as a long-lived daemon
//! rather than a one-shot CLI invocation).

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

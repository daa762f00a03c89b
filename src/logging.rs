//! Logging configuration for warescan.

use tracing_subscriber::EnvFilter;

/// Initializes logging to stderr.
///
/// The filter comes from `RUST_LOG`, defaulting to `info` so per-table and
/// per-tracking-ID progress is visible during a run.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

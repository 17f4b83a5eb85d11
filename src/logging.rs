//! Logging Setup
//!
//! Initializes a global `tracing` subscriber from a [`LoggingConfig`].
//! Hosts embedding the engine call this once at startup; tests may call it
//! repeatedly - re-initialization is a no-op.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `config`.
///
/// An invalid level filter falls back to `info`. If a subscriber is already
/// installed, the call does nothing.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    // Err means a subscriber is already set; keep it.
    if config.format == "json" {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

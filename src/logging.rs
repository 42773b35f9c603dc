//! Structured logging init.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber before anything else runs.
///
/// The teacher pins a fixed `Level::INFO`; here verbosity is controlled by
/// `RUST_LOG` via `EnvFilter` since this binary runs standalone rather than
/// under a supervisor that already owns its own logging policy.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

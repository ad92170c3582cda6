//! Logging initialization based on tracing.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// The log level is taken from the `RUST_LOG` environment variable when
/// set; otherwise `default_level` is used (e.g. `"info"`,
/// `"izakaya_client=debug"`).
///
/// Calling this more than once is a no-op: only the first subscriber wins.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(true)
        .try_init();

    tracing::debug!(default_level, "logger initialized");
}

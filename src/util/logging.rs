//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize logging for the process, filtered by `RUST_LOG` (default `info`).
///
/// Output goes to stdout. Safe to call multiple times.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .without_time()
        .try_init();
}

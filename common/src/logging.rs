//! Logging bootstrap
//!
//! Installs a `tracing-subscriber` formatter filtered by `RUST_LOG` or the
//! given default level.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber
///
/// Returns false when a subscriber was already installed, which happens
/// whenever several tests in one binary ask for logging.
pub fn init_logging(default_level: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .try_init()
        .is_ok()
}

/// Subscriber for tests: writes through the test harness capture
pub fn init_test_logging() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

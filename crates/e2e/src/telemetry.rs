//! Test logging

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Install a `fmt` subscriber that writes through the test harness.
///
/// Filtered by `RUST_LOG`, defaulting to `warn`. Safe to call from every
/// test; only the first call installs anything.
pub fn init_test_logging() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

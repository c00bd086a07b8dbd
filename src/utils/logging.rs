//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Initializes a `tracing` subscriber for binaries and tests that want log
/// output.
///
/// The filter is taken from `RUST_LOG` when set and defaults to `info`
/// otherwise. Calling this more than once is harmless; later calls are
/// ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

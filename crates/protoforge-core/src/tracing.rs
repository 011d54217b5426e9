//! Logging setup shared by the library and the CLI.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with protoforge defaults.
///
/// Sets up tracing-subscriber with:
/// - Environment filter (RUST_LOG)
/// - Compact format suitable for terminal output
pub fn init() {
    init_with_filter("info");
}

/// Initialize tracing with a custom default filter.
///
/// `RUST_LOG` still wins when set, so a user can always crank up verbosity
/// without touching CLI flags.
pub fn init_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

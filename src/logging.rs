// Logging setup
// Logs go to stderr so stdout stays free for the characters being played.
// RUST_LOG overrides the filter; DEBUG_LOGGING=1 turns on debug output for this crate.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init() {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_logging {
            EnvFilter::new("warn,morsetone_lib=debug,morsetone=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .try_init();

    tracing::debug!(debug_logging, "Logging initialized");
}

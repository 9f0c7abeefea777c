//! Tracing subscriber setup for the binary

use crate::config::settings::LoggingSettings;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber, writing to stderr.
///
/// Filter precedence: `--verbose`, then `RUST_LOG`, then the configured level.
pub fn init_logging(logging: &LoggingSettings, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(&logging.level)
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    // A second init (e.g. from tests) is not an error worth reporting.
    let _ = if logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
}

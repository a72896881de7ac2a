//! Tracing subscriber setup.
//!
//! Logs always go to stderr so command output on stdout stays clean.
//! `RUST_LOG` takes precedence over the configured level.

use crate::core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Build the filter from `RUST_LOG`, falling back to the configured level
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(config));

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.with_ansi(false).compact().try_init()
    };

    installed.is_ok()
}

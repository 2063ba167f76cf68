//! # Logging Setup
//!
//! `RUST_LOG` wins when set; otherwise the configured filter applies.

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Build the filter: `RUST_LOG` if present, else `fallback`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber. Logs go to stderr so reports on stdout
/// stay machine-readable.
pub fn init(filter: &str, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter))
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

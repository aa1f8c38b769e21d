//! Logging initialization.
//!
//! Logs always go to stderr; stdout carries only command output.

use std::io;

use anyhow::{anyhow, Result};
use image_search_core::config::LoggingConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` wins over `logging.level`.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| anyhow!("invalid logging.level '{}': {}", config.level, e)),
    }
}

/// Install the global subscriber.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let result = match config.format.as_str() {
        "pretty" => builder.pretty().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder.try_init(),
    };
    result.map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}

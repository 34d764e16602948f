//! Tracing subscriber setup for the binary

use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// Default directive for `level`; unknown names fall back to `info`
fn default_directive(level: &str) -> Directive {
    match level.parse::<LevelFilter>() {
        Ok(filter) => filter.into(),
        Err(_) => LevelFilter::INFO.into(),
    }
}

/// `RUST_LOG` directives on top of the configured level
#[must_use]
pub fn env_filter(config: &LoggingConfig, verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { config.level.as_str() };
    EnvFilter::builder()
        .with_default_directive(default_directive(level))
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_default())
}

/// Install the global subscriber; later calls are ignored
pub fn init(config: &LoggingConfig, verbose: bool) {
    let filter = env_filter(config, verbose);

    let result = if config.format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_filter(filter))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().pretty().with_filter(filter))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

use crate::core::config::LoggingConfig;

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system from configuration
///
/// `RUST_LOG` filters are applied on top of the configured ones. Returns
/// `false` when a logger was already installed.
pub fn init_with_config(config: &LoggingConfig) -> bool {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.filter_string());
    if let Ok(env_filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&env_filters);
    }
    builder.format_timestamp_millis().try_init().is_ok()
}

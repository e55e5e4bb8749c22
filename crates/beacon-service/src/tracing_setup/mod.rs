//! Tracing setup: structured logging and span definitions.

pub mod spans;

use beacon_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "BEACON_LOG";

/// Initialize tracing from the `[logging]` config section. `BEACON_LOG`
/// still wins over `level` when set.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing_from_config(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(&config.level));
    install(filter, config.json)
}

/// Initialize JSON tracing with an explicit filter directive, ignoring
/// `BEACON_LOG` (for embedding hosts that manage their own filter).
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing_with_filter(filter: &str) -> bool {
    install(EnvFilter::new(filter), true)
}

fn install(filter: EnvFilter, json: bool) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}

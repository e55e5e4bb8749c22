pub mod defaults;
mod logging_config;
mod rate_limit_config;
mod settings_config;
mod transport_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{BeaconResult, ConfigError};

pub use logging_config::LoggingConfig;
pub use rate_limit_config::RateLimitConfig;
pub use settings_config::SettingsConfig;
pub use transport_config::TransportConfig;

/// Top-level configuration. Every section falls back to its defaults when
/// omitted from the TOML source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub transport: TransportConfig,
    pub rate_limit: RateLimitConfig,
    pub settings: SettingsConfig,
    pub logging: LoggingConfig,
}

impl BeaconConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(source: &str) -> BeaconResult<Self> {
        let config: BeaconConfig = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> BeaconResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&source)
    }

    pub fn validate(&self) -> BeaconResult<()> {
        if self.transport.max_post_length == 0 {
            return Err(invalid("transport.max_post_length", "must be positive"));
        }
        if self.transport.endpoint_url.is_empty() {
            return Err(invalid("transport.endpoint_url", "must not be empty"));
        }
        let rl = &self.rate_limit;
        if !(rl.fill_rate_per_ms.is_finite() && rl.fill_rate_per_ms > 0.0) {
            return Err(invalid(
                "rate_limit.fill_rate_per_ms",
                "must be a positive number",
            ));
        }
        if rl.initial_tokens > rl.max_tokens {
            return Err(invalid(
                "rate_limit.initial_tokens",
                &format!("{} exceeds max_tokens {}", rl.initial_tokens, rl.max_tokens),
            ));
        }
        if !(1..=100).contains(&self.settings.default_sample_rate) {
            return Err(invalid(
                "settings.default_sample_rate",
                &format!("{} outside 1..=100", self.settings.default_sample_rate),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> crate::errors::BeaconError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

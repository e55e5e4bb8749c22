use serde::{Deserialize, Serialize};

use super::defaults;

/// Persisted settings layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Store key of the tracking-permitted flag.
    pub tracking_permitted_key: String,
    /// Store key of the anonymous user id.
    pub user_id_key: String,
    /// Sample rate in percent applied until changed at runtime.
    pub default_sample_rate: u32,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            tracking_permitted_key: defaults::DEFAULT_TRACKING_PERMITTED_KEY.to_string(),
            user_id_key: defaults::DEFAULT_USER_ID_KEY.to_string(),
            default_sample_rate: defaults::DEFAULT_SAMPLE_RATE,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::defaults;

/// Delivery endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Collection endpoint URL.
    pub endpoint_url: String,
    /// Largest encoded payload the endpoint accepts, in characters.
    pub max_post_length: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint_url: defaults::DEFAULT_ENDPOINT_URL.to_string(),
            max_post_length: defaults::DEFAULT_MAX_POST_LENGTH,
            timeout_secs: defaults::DEFAULT_TIMEOUT_SECS,
        }
    }
}

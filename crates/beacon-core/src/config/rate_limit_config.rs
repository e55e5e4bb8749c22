use serde::{Deserialize, Serialize};

use super::defaults;

/// Token bucket shared by every tracker of a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Tokens available at startup.
    pub initial_tokens: u32,
    /// Bucket capacity.
    pub max_tokens: u32,
    /// Tokens added per millisecond.
    pub fill_rate_per_ms: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            initial_tokens: defaults::DEFAULT_INITIAL_TOKENS,
            max_tokens: defaults::DEFAULT_MAX_TOKENS,
            fill_rate_per_ms: defaults::DEFAULT_FILL_RATE_PER_MS,
        }
    }
}

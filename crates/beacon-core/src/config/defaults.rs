// Single source of truth for all default values.

// --- Transport ---
pub const DEFAULT_ENDPOINT_URL: &str = "https://www.google-analytics.com/collect";
pub const DEFAULT_MAX_POST_LENGTH: usize = 8_192;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// --- Rate limiting ---
pub const DEFAULT_INITIAL_TOKENS: u32 = 60;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_FILL_RATE_PER_MS: f64 = 0.0005; // one token every 2s

// --- Settings ---
pub const DEFAULT_TRACKING_PERMITTED_KEY: &str = "analytics.tracking-permitted";
pub const DEFAULT_USER_ID_KEY: &str = "analytics.user-id";
pub const DEFAULT_SAMPLE_RATE: u32 = 100;

// --- Logging ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_JSON: bool = true;

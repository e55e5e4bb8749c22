//! Pull-based token bucket on an injectable clock.
//!
//! Tokens are replenished lazily when [`TokenBucket::consume_tokens`] runs:
//! `floor(elapsed_ms * fill_rate_per_ms)` whole tokens are added, capped at
//! `max_tokens`. The fill timestamp only advances when at least one whole
//! token was added, so slow fill rates still accumulate across calls.

use std::sync::{Arc, Mutex, MutexGuard};

use beacon_core::config::RateLimitConfig;
use beacon_core::traits::IClock;

#[derive(Debug)]
struct BucketState {
    available: u32,
    last_filled_at: i64,
}

/// Token bucket shared by every tracker of one service.
pub struct TokenBucket {
    state: Mutex<BucketState>,
    max_tokens: u32,
    fill_rate_per_ms: f64,
    clock: Arc<dyn IClock>,
}

impl TokenBucket {
    /// `initial_tokens` is clamped to `max_tokens`.
    pub fn new(
        initial_tokens: u32,
        max_tokens: u32,
        fill_rate_per_ms: f64,
        clock: Arc<dyn IClock>,
    ) -> Self {
        let last_filled_at = clock.now_millis();
        Self {
            state: Mutex::new(BucketState {
                available: initial_tokens.min(max_tokens),
                last_filled_at,
            }),
            max_tokens,
            fill_rate_per_ms,
            clock,
        }
    }

    pub fn from_config(config: &RateLimitConfig, clock: Arc<dyn IClock>) -> Self {
        Self::new(
            config.initial_tokens,
            config.max_tokens,
            config.fill_rate_per_ms,
            clock,
        )
    }

    /// Replenish, then take `n` tokens if that many are available.
    pub fn consume_tokens(&self, n: u32) -> bool {
        let now = self.clock.now_millis();
        let mut state = self.lock_state();

        let elapsed = now.saturating_sub(state.last_filled_at).max(0) as f64;
        let whole = (elapsed * self.fill_rate_per_ms).floor();
        if whole >= 1.0 {
            // Saturating float-to-int cast; anything past max is clamped anyway.
            let added = whole as u32;
            state.available = state.available.saturating_add(added).min(self.max_tokens);
            state.last_filled_at = now;
        }

        if state.available >= n {
            state.available -= n;
            true
        } else {
            false
        }
    }

    /// Tokens available as of the last replenishment.
    pub fn available_tokens(&self) -> u32 {
        self.lock_state().available
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn lock_state(&self) -> MutexGuard<'_, BucketState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for TokenBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucket")
            .field("available", &self.available_tokens())
            .field("max_tokens", &self.max_tokens)
            .field("fill_rate_per_ms", &self.fill_rate_per_ms)
            .finish()
    }
}

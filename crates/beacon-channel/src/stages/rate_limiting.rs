use std::sync::Arc;

use async_trait::async_trait;

use beacon_core::errors::BeaconResult;
use beacon_core::traits::IChannel;
use beacon_core::{HitType, ParameterMap, SendResult, SendStatus};

use crate::token_bucket::TokenBucket;

/// Throttles hits through a shared [`TokenBucket`]. Commerce hits
/// (transactions and items) are never throttled.
pub struct RateLimitingChannel {
    bucket: Arc<TokenBucket>,
    delegate: Arc<dyn IChannel>,
}

impl RateLimitingChannel {
    pub fn new(bucket: Arc<TokenBucket>, delegate: Arc<dyn IChannel>) -> Self {
        Self { bucket, delegate }
    }
}

#[async_trait]
impl IChannel for RateLimitingChannel {
    async fn send(&self, hit_type: HitType, parameters: ParameterMap) -> BeaconResult<SendResult> {
        if !hit_type.is_commerce() && !self.bucket.consume_tokens(1) {
            tracing::debug!(%hit_type, "rate_limiting: no token available");
            return Ok(SendResult::with_status(SendStatus::RateLimited));
        }
        self.delegate.send(hit_type, parameters).await
    }
}

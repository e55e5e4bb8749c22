use async_trait::async_trait;

use beacon_core::errors::BeaconResult;
use beacon_core::traits::IChannel;
use beacon_core::{HitType, ParameterMap, SendResult};

/// Swallows every hit. Used when tracking is not permitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyChannel;

#[async_trait]
impl IChannel for DummyChannel {
    async fn send(&self, _hit_type: HitType, _parameters: ParameterMap) -> BeaconResult<SendResult> {
        Ok(SendResult::sent())
    }
}

use async_trait::async_trait;

use crate::errors::BeaconResult;
use crate::hit::HitType;
use crate::parameter::ParameterMap;
use crate::result::SendResult;

/// One stage of the hit pipeline.
///
/// A stage may mutate `parameters` before handing them to its delegate, or
/// resolve on its own without delegating. Policy rejections resolve `Ok` with
/// a non-`Sent` status; `Err` is reserved for misuse and transport failure.
#[async_trait]
pub trait IChannel: Send + Sync {
    async fn send(&self, hit_type: HitType, parameters: ParameterMap) -> BeaconResult<SendResult>;
}

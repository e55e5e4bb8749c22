//! # beacon-channel
//!
//! The stages of the hit pipeline. Each stage implements
//! [`beacon_core::traits::IChannel`] and wraps exactly one downstream
//! delegate, so a pipeline is a chain of `Arc<dyn IChannel>`:
//!
//! ```text
//! Filter → AsyncSettings → UserSampling → RateLimiting
//!        → ParameterFilter → EventPublishing → Http
//! ```
//!
//! Policy rejections resolve `Ok` with a non-`Sent` status and never reach
//! the delegate.

pub mod stages;
pub mod token_bucket;

pub use stages::{
    encode_payload, sampling_key, AsyncSettingsChannel, DivertBuffer, DivertingChannel,
    DummyChannel, EventPublishingChannel, Filter, FilterChannel, FilterList, HitSent,
    HttpChannel, ParameterFilterChannel, PendingHit, RateLimitingChannel, UserSamplingChannel,
};
pub use token_bucket::TokenBucket;

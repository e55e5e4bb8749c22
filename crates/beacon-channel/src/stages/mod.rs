//! Pipeline stages. Each wraps one delegate, except the terminal stages
//! ([`HttpChannel`], [`DummyChannel`], [`DivertingChannel`]).

mod async_settings;
mod diverting;
mod dummy;
mod event_publishing;
mod filter;
mod http;
mod parameter_filter;
mod rate_limiting;
mod user_sampling;

pub use async_settings::AsyncSettingsChannel;
pub use diverting::{DivertBuffer, DivertingChannel, PendingHit};
pub use dummy::DummyChannel;
pub use event_publishing::{EventPublishingChannel, HitSent};
pub use filter::{Filter, FilterChannel, FilterList};
pub use http::{encode_payload, HttpChannel};
pub use parameter_filter::ParameterFilterChannel;
pub use rate_limiting::RateLimitingChannel;
pub use user_sampling::{sampling_key, UserSamplingChannel};

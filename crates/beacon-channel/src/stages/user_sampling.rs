use std::sync::Arc;

use async_trait::async_trait;

use beacon_core::errors::{BeaconError, BeaconResult, ChannelError, ParameterError};
use beacon_core::traits::IChannel;
use beacon_core::{HitType, KnownParameter, ParameterMap, SendResult, SendStatus, Value};
use beacon_settings::ServiceSettings;

/// Sampling keys span `0..=0xFFFF`; one percent of that range.
const KEY_SPACE_PER_PERCENT: f64 = 655.36;

const MIN_RATE: i64 = 1;
const MAX_RATE: i64 = 100;

/// Drops every hit of users outside the sample.
///
/// A user is in the sample when the sampling key of their client id is below
/// `rate * 655.36`, where `rate` is the hit's `sf` override if present, else
/// the settings' sample rate. The client id must already be stamped, so this
/// stage sits below [`crate::AsyncSettingsChannel`].
pub struct UserSamplingChannel {
    settings: Arc<ServiceSettings>,
    delegate: Arc<dyn IChannel>,
}

impl UserSamplingChannel {
    pub fn new(settings: Arc<ServiceSettings>, delegate: Arc<dyn IChannel>) -> Self {
        Self { settings, delegate }
    }

    /// The `sf` override must be an integer percentage in `1..=100`.
    fn effective_rate(&self, parameters: &ParameterMap) -> BeaconResult<f64> {
        let Some(raw) = parameters.get(&KnownParameter::SampleRateOverride) else {
            return Ok(f64::from(self.settings.sample_rate()?));
        };
        let descriptor = KnownParameter::SampleRateOverride.descriptor();
        let rate = descriptor.coerce(raw.clone())?.as_integer().unwrap_or_default();
        if !(MIN_RATE..=MAX_RATE).contains(&rate) {
            return Err(ParameterError::OutOfRange {
                wire_name: descriptor.wire_name().to_string(),
                value: rate,
                min: MIN_RATE,
                max: MAX_RATE,
            }
            .into());
        }
        Ok(rate as f64)
    }
}

#[async_trait]
impl IChannel for UserSamplingChannel {
    async fn send(&self, hit_type: HitType, parameters: ParameterMap) -> BeaconResult<SendResult> {
        let client_id = parameters
            .get(&KnownParameter::ClientId)
            .and_then(Value::as_text)
            .ok_or(ChannelError::MissingClientId)?;
        let key = sampling_key(client_id)?;
        let rate = self.effective_rate(&parameters)?;

        if f64::from(key) < rate * KEY_SPACE_PER_PERCENT {
            self.delegate.send(hit_type, parameters).await
        } else {
            tracing::debug!(%hit_type, key, rate, "user_sampling: sampled out");
            Ok(SendResult::with_status(SendStatus::SampledOut))
        }
    }
}

/// The second hyphen-delimited segment of a UUID, read as 16-bit hex.
pub fn sampling_key(client_id: &str) -> BeaconResult<u16> {
    let malformed = |reason: &str| ChannelError::MalformedClientId {
        client_id: client_id.to_string(),
        reason: reason.to_string(),
    };
    let segment = client_id
        .split('-')
        .nth(1)
        .ok_or_else(|| malformed("no second segment"))?;
    if segment.len() != 4 {
        return Err(malformed("second segment is not four hex digits").into());
    }
    u16::from_str_radix(segment, 16).map_err(|e| BeaconError::from(malformed(&e.to_string())))
}

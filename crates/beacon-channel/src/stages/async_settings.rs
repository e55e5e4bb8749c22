use std::sync::Arc;

use async_trait::async_trait;

use beacon_core::errors::{BeaconResult, SettingsError};
use beacon_core::traits::IChannel;
use beacon_core::{HitType, KnownParameter, ParameterMap, SendResult};
use beacon_settings::ServiceSettings;

/// Stamps the persisted user id into the client id parameter.
pub struct AsyncSettingsChannel {
    settings: Arc<ServiceSettings>,
    delegate: Arc<dyn IChannel>,
}

impl AsyncSettingsChannel {
    /// Fails with `SettingsError::NotReady` unless `settings` finished loading.
    pub fn new(settings: Arc<ServiceSettings>, delegate: Arc<dyn IChannel>) -> BeaconResult<Self> {
        if !settings.is_ready() {
            return Err(SettingsError::NotReady.into());
        }
        Ok(Self { settings, delegate })
    }
}

#[async_trait]
impl IChannel for AsyncSettingsChannel {
    async fn send(&self, hit_type: HitType, mut parameters: ParameterMap) -> BeaconResult<SendResult> {
        parameters.set(KnownParameter::ClientId, self.settings.user_id()?);
        self.delegate.send(hit_type, parameters).await
    }
}

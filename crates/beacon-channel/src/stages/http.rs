use std::sync::Arc;

use async_trait::async_trait;

use beacon_core::config::TransportConfig;
use beacon_core::errors::BeaconResult;
use beacon_core::traits::{IChannel, ITransport};
use beacon_core::{HitType, ParameterMap, SendResult, SendStatus};

/// Terminal stage: encodes the hit and POSTs it once.
///
/// Offline and oversized hits resolve `Ok` with a non-sent status. A failed
/// POST is not retried and resolves `Err(ChannelError::Delivery)`, which
/// [`BeaconError::is_programmer_error`] reports as an absorbable failure, so
/// callers can tell a lost hit apart from a delivered one.
///
/// [`BeaconError::is_programmer_error`]: beacon_core::errors::BeaconError::is_programmer_error
pub struct HttpChannel {
    transport: Arc<dyn ITransport>,
    endpoint_url: String,
    max_post_length: usize,
}

impl HttpChannel {
    pub fn new(transport: Arc<dyn ITransport>, config: &TransportConfig) -> Self {
        Self {
            transport,
            endpoint_url: config.endpoint_url.clone(),
            max_post_length: config.max_post_length,
        }
    }
}

#[async_trait]
impl IChannel for HttpChannel {
    async fn send(&self, hit_type: HitType, parameters: ParameterMap) -> BeaconResult<SendResult> {
        if !self.transport.is_online() {
            tracing::debug!(%hit_type, "http: device offline");
            return Ok(SendResult::with_status(SendStatus::DeviceOffline));
        }

        let payload = encode_payload(hit_type, &parameters);
        if payload.len() > self.max_post_length {
            tracing::warn!(
                %hit_type,
                actual = payload.len(),
                max = self.max_post_length,
                "http: payload too big"
            );
            return Ok(SendResult::payload_too_big(payload.len(), self.max_post_length));
        }

        if let Err(e) = self.transport.post(&self.endpoint_url, payload).await {
            tracing::warn!(%hit_type, error = %e, "http: delivery failed");
            return Err(e);
        }
        tracing::debug!(%hit_type, "http: sent");
        Ok(SendResult::sent())
    }
}

/// URL-encoded request body: `t=<hit type>` first, then every parameter as
/// `wire=value`, joined with `&`.
pub fn encode_payload(hit_type: HitType, parameters: &ParameterMap) -> String {
    let mut body = format!("{}={}", HitType::WIRE_NAME, hit_type.wire_code());
    for (parameter, value) in parameters.iter() {
        body.push('&');
        body.push_str(&urlencoding::encode(parameter.wire_name()));
        body.push('=');
        body.push_str(&urlencoding::encode(&value.to_wire()));
    }
    body
}

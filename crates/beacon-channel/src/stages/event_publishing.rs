use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use beacon_core::errors::BeaconResult;
use beacon_core::traits::IChannel;
use beacon_core::{HitType, ParameterMap, SendResult};

/// Announced for every hit that reaches delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct HitSent {
    pub hit_type: HitType,
    pub parameters: ParameterMap,
}

/// Publishes a [`HitSent`] snapshot, then delegates.
pub struct EventPublishingChannel {
    events: broadcast::Sender<HitSent>,
    delegate: Arc<dyn IChannel>,
}

impl EventPublishingChannel {
    pub fn new(events: broadcast::Sender<HitSent>, delegate: Arc<dyn IChannel>) -> Self {
        Self { events, delegate }
    }
}

#[async_trait]
impl IChannel for EventPublishingChannel {
    async fn send(&self, hit_type: HitType, parameters: ParameterMap) -> BeaconResult<SendResult> {
        // Err only means nobody is listening.
        let _ = self.events.send(HitSent {
            hit_type,
            parameters: parameters.clone(),
        });
        self.delegate.send(hit_type, parameters).await
    }
}

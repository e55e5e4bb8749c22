use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use beacon_core::errors::BeaconResult;
use beacon_core::traits::IChannel;
use beacon_core::{Hit, HitType, ParameterMap, SendResult, SendStatus};

/// A hit filter. May mutate the hit's parameters or cancel it.
pub type Filter = Arc<dyn Fn(&mut Hit) + Send + Sync>;

/// Filters shared between the service (which installs them) and the
/// pipeline (which runs them). Installation order is execution order.
pub type FilterList = Arc<RwLock<Vec<Filter>>>;

/// Runs the installed filters over each hit before delegating.
pub struct FilterChannel {
    filters: FilterList,
    delegate: Arc<dyn IChannel>,
}

impl FilterChannel {
    pub fn new(filters: FilterList, delegate: Arc<dyn IChannel>) -> Self {
        Self { filters, delegate }
    }

    fn snapshot(&self) -> Vec<Filter> {
        self.filters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl IChannel for FilterChannel {
    async fn send(&self, hit_type: HitType, parameters: ParameterMap) -> BeaconResult<SendResult> {
        let mut hit = Hit::new(hit_type, parameters);
        for filter in self.snapshot() {
            filter(&mut hit);
            if hit.is_canceled() {
                tracing::debug!(%hit_type, "filter: hit canceled");
                return Ok(SendResult::with_status(SendStatus::Canceled));
            }
        }
        self.delegate.send(hit_type, hit.into_parameters()).await
    }
}

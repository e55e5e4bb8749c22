//! ChannelManager: registry of the instances every tracker of a service
//! shares, and builder of the enabled pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use beacon_channel::{
    AsyncSettingsChannel, EventPublishingChannel, Filter, FilterChannel, FilterList, HitSent,
    HttpChannel, ParameterFilterChannel, RateLimitingChannel, TokenBucket, UserSamplingChannel,
};
use beacon_core::config::BeaconConfig;
use beacon_core::errors::{BeaconResult, ChannelError};
use beacon_core::traits::{IChannel, IClock, ITransport};
use beacon_settings::ServiceSettings;

/// Capacity of the hit event channel before slow subscribers start lagging.
const HIT_EVENT_CAPACITY: usize = 256;

/// Second phase of pipeline construction, run once settings are ready.
pub trait EnabledChannelBuilder: Send + Sync {
    /// Build the enabled branch. Called at most once per builder; a second
    /// call fails with `ChannelError::AlreadyBuilt`.
    fn build(&self, settings: Arc<ServiceSettings>) -> BeaconResult<Arc<dyn IChannel>>;
}

/// Owns the token bucket, filter list, hit event sender and transport of one
/// service.
pub struct ChannelManager {
    config: BeaconConfig,
    bucket: Arc<TokenBucket>,
    filters: FilterList,
    hit_events: broadcast::Sender<HitSent>,
    transport: Arc<dyn ITransport>,
    built: AtomicBool,
}

impl ChannelManager {
    pub fn new(config: BeaconConfig, transport: Arc<dyn ITransport>, clock: Arc<dyn IClock>) -> Self {
        let bucket = Arc::new(TokenBucket::from_config(&config.rate_limit, clock));
        let (hit_events, _) = broadcast::channel(HIT_EVENT_CAPACITY);
        Self {
            config,
            bucket,
            filters: Arc::new(RwLock::new(Vec::new())),
            hit_events,
            transport,
            built: AtomicBool::new(false),
        }
    }

    /// Append a filter. Applies to every hit sent afterwards, on every tracker.
    pub fn add_filter(&self, filter: Filter) {
        self.filters
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(filter);
    }

    pub fn filter_count(&self) -> usize {
        self.filters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Receive a [`HitSent`] for every hit that reaches delivery.
    pub fn subscribe_hits(&self) -> broadcast::Receiver<HitSent> {
        self.hit_events.subscribe()
    }

    pub fn bucket(&self) -> &Arc<TokenBucket> {
        &self.bucket
    }

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }
}

impl EnabledChannelBuilder for ChannelManager {
    fn build(&self, settings: Arc<ServiceSettings>) -> BeaconResult<Arc<dyn IChannel>> {
        if self.built.swap(true, Ordering::SeqCst) {
            return Err(ChannelError::AlreadyBuilt.into());
        }

        let http: Arc<dyn IChannel> = Arc::new(HttpChannel::new(
            Arc::clone(&self.transport),
            &self.config.transport,
        ));
        let publishing: Arc<dyn IChannel> =
            Arc::new(EventPublishingChannel::new(self.hit_events.clone(), http));
        let shaping: Arc<dyn IChannel> = Arc::new(ParameterFilterChannel::new(publishing));
        let limiting: Arc<dyn IChannel> =
            Arc::new(RateLimitingChannel::new(Arc::clone(&self.bucket), shaping));
        let sampling: Arc<dyn IChannel> =
            Arc::new(UserSamplingChannel::new(Arc::clone(&settings), limiting));
        let stamping: Arc<dyn IChannel> = Arc::new(AsyncSettingsChannel::new(settings, sampling)?);
        let filtering: Arc<dyn IChannel> =
            Arc::new(FilterChannel::new(Arc::clone(&self.filters), stamping));

        tracing::info!("channel_manager: enabled pipeline built");
        Ok(filtering)
    }
}

impl std::fmt::Debug for ChannelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelManager")
            .field("bucket", &self.bucket)
            .field("filters", &self.filter_count())
            .field("built", &self.built.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

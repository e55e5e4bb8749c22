//! AnalyticsService: wires settings, the channel registry and the service
//! channel together and hands out trackers.

use std::sync::Arc;

use tokio::sync::broadcast;

use beacon_channel::{Filter, HitSent};
use beacon_core::config::BeaconConfig;
use beacon_core::errors::BeaconResult;
use beacon_core::traits::{IChannel, IClock, IKeyValueStore, IOptOut, ITransport, SystemClock};
use beacon_core::{KnownParameter, ParameterMap};
use beacon_settings::{MemoryStore, ServiceSettings};

use crate::channel_manager::ChannelManager;
use crate::service_channel::{ChannelState, ServiceChannel};
use crate::tracker::ServiceTracker;
use crate::transport::ReqwestTransport;

/// Measurement protocol version stamped on every hit.
const PROTOCOL_VERSION: &str = "1";

/// Name and version of the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

impl AppInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Builder for [`AnalyticsService`]. Anything not supplied falls back to a
/// default: in-memory store, `reqwest` transport, system clock, no opt-out.
pub struct AnalyticsServiceBuilder {
    app: AppInfo,
    config: BeaconConfig,
    store: Option<Arc<dyn IKeyValueStore>>,
    transport: Option<Arc<dyn ITransport>>,
    clock: Option<Arc<dyn IClock>>,
    opt_out: Option<Arc<dyn IOptOut>>,
}

impl AnalyticsServiceBuilder {
    pub fn config(mut self, config: BeaconConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<dyn IKeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn ITransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn IClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn opt_out(mut self, opt_out: Arc<dyn IOptOut>) -> Self {
        self.opt_out = Some(opt_out);
        self
    }

    /// Validate the config and start loading settings. Must be called from
    /// within a tokio runtime.
    pub fn build(self) -> BeaconResult<AnalyticsService> {
        self.config.validate()?;

        let store: Arc<dyn IKeyValueStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::new()),
        };
        let transport: Arc<dyn ITransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config.transport)?),
        };
        let clock: Arc<dyn IClock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };

        let settings = ServiceSettings::spawn(store, self.config.settings.clone(), self.opt_out);
        let manager = Arc::new(ChannelManager::new(
            self.config,
            transport,
            Arc::clone(&clock),
        ));
        let channel = ServiceChannel::spawn(Arc::clone(&settings), manager.clone());

        tracing::info!(app = %self.app.name, version = %self.app.version, "service: started");
        Ok(AnalyticsService {
            app: self.app,
            settings,
            manager,
            channel,
            clock,
        })
    }
}

/// One analytics service per host application.
pub struct AnalyticsService {
    app: AppInfo,
    settings: Arc<ServiceSettings>,
    manager: Arc<ChannelManager>,
    channel: Arc<ServiceChannel>,
    clock: Arc<dyn IClock>,
}

impl AnalyticsService {
    pub fn builder(app: AppInfo) -> AnalyticsServiceBuilder {
        AnalyticsServiceBuilder {
            app,
            config: BeaconConfig::default(),
            store: None,
            transport: None,
            clock: None,
            opt_out: None,
        }
    }

    /// A tracker for `tracking_id`, pre-stamped with the app name and version.
    pub fn tracker(&self, tracking_id: &str) -> ServiceTracker {
        let sticky = ParameterMap::from_iter([
            (KnownParameter::TrackingId, tracking_id),
            (KnownParameter::AppName, self.app.name.as_str()),
            (KnownParameter::AppVersion, self.app.version.as_str()),
            (KnownParameter::ApiVersion, PROTOCOL_VERSION),
        ]);
        let channel: Arc<dyn IChannel> = self.channel.clone();
        ServiceTracker::new(sticky, channel, Arc::clone(&self.clock))
    }

    pub fn settings(&self) -> &Arc<ServiceSettings> {
        &self.settings
    }

    /// Install a filter for every tracker of this service.
    pub fn add_filter(&self, filter: Filter) {
        self.manager.add_filter(filter);
    }

    pub fn subscribe_hits(&self) -> broadcast::Receiver<HitSent> {
        self.manager.subscribe_hits()
    }

    /// Resolve once settings loaded (or failed to) and buffered hits were
    /// replayed.
    pub async fn wait_ready(&self) -> BeaconResult<()> {
        self.channel.wait_ready().await
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    pub fn app(&self) -> &AppInfo {
        &self.app
    }
}

impl std::fmt::Debug for AnalyticsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsService")
            .field("app", &self.app)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

//! ServiceChannel: entry point of the shared pipeline.
//!
//! Until settings are ready every hit is diverted into a FIFO buffer. Once
//! they are, the enabled branch is built, the buffer is replayed through the
//! branch consent selects, and from then on hits flow straight through. A
//! consent change reselects the branch. A failed settings load routes
//! everything to the disabled branch for good.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::Instrument;

use beacon_channel::{DivertBuffer, DivertingChannel, DummyChannel};
use beacon_core::errors::{BeaconResult, ChannelError};
use beacon_core::traits::IChannel;
use beacon_core::{HitType, ParameterMap, SendResult};
use beacon_settings::{ServiceSettings, SettingsProperty};

use crate::channel_manager::EnabledChannelBuilder;

/// Where hits currently go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Settings still loading; hits are buffered.
    PreReady,
    /// Tracking permitted; hits go through the enabled pipeline.
    Enabled,
    /// Tracking not permitted; hits go to the disabled branch.
    Disabled,
    /// Settings failed to load; hits go to the disabled branch from now on.
    Failed,
}

pub struct ServiceChannel {
    settings: Arc<ServiceSettings>,
    diverting: DivertingChannel,
    disabled: Arc<dyn IChannel>,
    enabled: OnceLock<Arc<dyn IChannel>>,
    state: Mutex<ChannelState>,
    settled_tx: watch::Sender<bool>,
}

impl ServiceChannel {
    /// Create the channel and start waiting for `settings` in a background
    /// task. Must be called from within a tokio runtime.
    pub fn spawn(settings: Arc<ServiceSettings>, builder: Arc<dyn EnabledChannelBuilder>) -> Arc<Self> {
        let channel = Self::new(settings);
        let driver = Arc::clone(&channel);
        tokio::spawn(async move { driver.bootstrap(builder.as_ref()).await });
        channel
    }

    /// Create the channel without starting the bootstrap. Drive it with
    /// [`ServiceChannel::bootstrap`]. Disabled hits are dropped.
    pub fn new(settings: Arc<ServiceSettings>) -> Arc<Self> {
        Self::with_disabled(settings, Arc::new(DummyChannel))
    }

    /// Like [`ServiceChannel::new`], with hits of the disabled branch going
    /// to `disabled` instead of being dropped.
    pub fn with_disabled(settings: Arc<ServiceSettings>, disabled: Arc<dyn IChannel>) -> Arc<Self> {
        let (settled_tx, _) = watch::channel(false);
        let channel = Arc::new(Self {
            settings: Arc::clone(&settings),
            diverting: DivertingChannel::new(DivertBuffer::new()),
            disabled,
            enabled: OnceLock::new(),
            state: Mutex::new(ChannelState::PreReady),
            settled_tx,
        });

        let weak = Arc::downgrade(&channel);
        settings.add_change_listener(move |property| {
            if property != SettingsProperty::TrackingPermitted {
                return;
            }
            if let Some(channel) = weak.upgrade() {
                channel.reselect();
            }
        });
        channel
    }

    /// Wait for settings, then build, replay and switch over.
    pub async fn bootstrap(&self, builder: &dyn EnabledChannelBuilder) {
        match self.settings.when_ready().await {
            Ok(()) => {
                if let Err(e) = self.activate(builder).await {
                    tracing::warn!(error = %e, "service_channel: activation failed");
                    self.fail();
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "service_channel: settings failed to load");
                self.fail();
            }
        }
        self.settled_tx.send_replace(true);
    }

    /// Resolve once the channel left `PreReady` and the buffer is drained.
    pub async fn wait_ready(&self) -> BeaconResult<()> {
        let mut rx = self.settled_tx.subscribe();
        rx.wait_for(|settled| *settled)
            .await
            .map(|_| ())
            .map_err(|_| ChannelError::Delivery {
                reason: "service channel dropped before it settled".to_string(),
            })?;
        Ok(())
    }

    pub fn state(&self) -> ChannelState {
        *self.lock_state()
    }

    /// Hits currently held back.
    pub fn pending(&self) -> usize {
        self.diverting.buffer().len()
    }

    async fn activate(&self, builder: &dyn EnabledChannelBuilder) -> BeaconResult<()> {
        let enabled = builder.build(Arc::clone(&self.settings))?;
        let enabled = self.enabled.get_or_init(|| enabled).clone();

        let permitted = self.settings.is_tracking_permitted()?;
        let target = if permitted {
            enabled
        } else {
            Arc::clone(&self.disabled)
        };

        let buffer = self.diverting.buffer();
        let span = crate::replay_span!(buffer.len(), permitted);
        async {
            let mut replayed = 0usize;
            // Hits arriving mid-replay are appended and drained here too.
            while let Some(hit) = buffer.pop_or_close(|| self.settle()) {
                if let Err(e) = target.send(hit.hit_type, hit.parameters).await {
                    tracing::warn!(error = %e, hit_type = %hit.hit_type, "service_channel: replayed hit failed");
                }
                replayed += 1;
            }
            tracing::info!(replayed, state = ?self.state(), "service_channel: ready");
        }
        .instrument(span)
        .await;
        Ok(())
    }

    fn fail(&self) {
        *self.lock_state() = ChannelState::Failed;
        let dropped = self.diverting.buffer().discard();
        if dropped > 0 {
            tracing::warn!(dropped, "service_channel: discarded hits buffered before failure");
        }
    }

    /// Leave `PreReady`. Runs under the buffer lock as the buffer closes.
    fn settle(&self) {
        let next = self.state_for_consent();
        *self.lock_state() = next;
    }

    fn reselect(&self) {
        let mut state = self.lock_state();
        if matches!(*state, ChannelState::Enabled | ChannelState::Disabled) {
            let next = self.state_for_consent();
            if *state != next {
                tracing::info!(from = ?*state, to = ?next, "service_channel: consent changed");
                *state = next;
            }
        }
    }

    fn state_for_consent(&self) -> ChannelState {
        match self.settings.is_tracking_permitted() {
            Ok(true) if self.enabled.get().is_some() => ChannelState::Enabled,
            _ => ChannelState::Disabled,
        }
    }

    /// The branch for the current state, or `None` while hits are buffered.
    fn route(&self) -> Option<Arc<dyn IChannel>> {
        match self.state() {
            ChannelState::PreReady => None,
            ChannelState::Enabled => self.enabled.get().cloned(),
            ChannelState::Disabled | ChannelState::Failed => Some(Arc::clone(&self.disabled)),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IChannel for ServiceChannel {
    async fn send(&self, hit_type: HitType, parameters: ParameterMap) -> BeaconResult<SendResult> {
        if let Some(branch) = self.route() {
            return branch.send(hit_type, parameters).await;
        }
        match self.diverting.try_divert(hit_type, parameters) {
            Ok(queued) => {
                tracing::debug!(%hit_type, "service_channel: queued until settings are ready");
                Ok(queued)
            }
            // The buffer closed between the state check and the push; the
            // state was switched before the close, so a route exists now.
            Err(hit) => {
                let branch = self.route().ok_or(ChannelError::BufferDrained)?;
                branch.send(hit.hit_type, hit.parameters).await
            }
        }
    }
}

impl std::fmt::Debug for ServiceChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceChannel")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

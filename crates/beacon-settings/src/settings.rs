//! ServiceSettings: async-loaded, persisted, observable settings.
//!
//! Lifecycle: `Loading` → `Ready` (or `Failed` when the store rejects a read
//! or write during the initial load). Once ready, store change notifications
//! trigger a reload and listeners hear about properties whose value changed.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::{broadcast, watch};

use beacon_core::config::SettingsConfig;
use beacon_core::errors::{BeaconResult, SettingsError};
use beacon_core::traits::{IKeyValueStore, IOptOut, NeverOptedOut, StorageChange};

use crate::listener::{ChangeListener, SettingsProperty};
use crate::user_id;

/// Readiness of the settings, observed through a `watch` channel so any
/// number of tasks can await the same one-shot transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone)]
struct Cached {
    tracking_permitted: bool,
    sample_rate: u32,
    user_id: String,
}

/// Settings shared by every tracker of one service.
pub struct ServiceSettings {
    store: Arc<dyn IKeyValueStore>,
    config: SettingsConfig,
    opt_out: Arc<dyn IOptOut>,
    cached: Mutex<Cached>,
    listeners: Mutex<Vec<ChangeListener>>,
    ready_tx: watch::Sender<ReadyState>,
}

impl ServiceSettings {
    /// Create the settings and start loading them in a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        store: Arc<dyn IKeyValueStore>,
        config: SettingsConfig,
        opt_out: Option<Arc<dyn IOptOut>>,
    ) -> Arc<Self> {
        let settings = Self::new(store, config, opt_out);
        let loader = Arc::clone(&settings);
        tokio::spawn(async move { loader.initialize().await });
        settings
    }

    /// Create the settings without loading. Call [`ServiceSettings::initialize`]
    /// to drive the load on the current task.
    pub fn new(
        store: Arc<dyn IKeyValueStore>,
        config: SettingsConfig,
        opt_out: Option<Arc<dyn IOptOut>>,
    ) -> Arc<Self> {
        let (ready_tx, _) = watch::channel(ReadyState::Loading);
        Arc::new(Self {
            store,
            cached: Mutex::new(Cached {
                tracking_permitted: true,
                sample_rate: config.default_sample_rate,
                user_id: String::new(),
            }),
            config,
            opt_out: opt_out.unwrap_or_else(|| Arc::new(NeverOptedOut)),
            listeners: Mutex::new(Vec::new()),
            ready_tx,
        })
    }

    /// Load both persisted values concurrently, then mark the settings ready
    /// and start watching the store for outside changes.
    ///
    /// Calling this on settings that already left `Loading` is a no-op.
    pub async fn initialize(self: &Arc<Self>) {
        if *self.ready_tx.borrow() != ReadyState::Loading {
            return;
        }
        // Subscribe first so nothing written during the load is missed.
        let changes = self.store.subscribe();

        let (permitted, user_id) = tokio::join!(self.load_tracking_permitted(), self.load_user_id());
        match (permitted, user_id) {
            (Ok(permitted), Ok(user_id)) => {
                {
                    let mut cached = self.lock_cached();
                    cached.tracking_permitted = permitted;
                    cached.user_id = user_id;
                }
                self.ready_tx.send_replace(ReadyState::Ready);
                tracing::info!(tracking_permitted = permitted, "settings: ready");
                spawn_watcher(Arc::downgrade(self), changes);
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "settings: load failed");
                self.ready_tx.send_replace(ReadyState::Failed(e.to_string()));
            }
        }
    }

    /// Resolve once loading finished. Any number of callers may await this.
    pub async fn when_ready(&self) -> BeaconResult<()> {
        let mut rx = self.ready_tx.subscribe();
        let state = rx
            .wait_for(|s| *s != ReadyState::Loading)
            .await
            .map(|s| s.clone())
            .map_err(|_| SettingsError::LoadFailed {
                reason: "settings dropped while loading".to_string(),
            })?;
        match state {
            ReadyState::Failed(reason) => Err(SettingsError::LoadFailed { reason }.into()),
            _ => Ok(()),
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_tx.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        *self.ready_tx.borrow() == ReadyState::Ready
    }

    /// Register a listener. Allowed before the settings are ready.
    pub fn add_change_listener(&self, listener: impl Fn(SettingsProperty) + Send + Sync + 'static) {
        self.lock_listeners().push(Arc::new(listener));
    }

    /// Consent as persisted, vetoed by the third-party opt-out probe.
    pub fn is_tracking_permitted(&self) -> BeaconResult<bool> {
        self.ensure_ready()?;
        let stored = self.lock_cached().tracking_permitted;
        Ok(stored && !self.opt_out.is_opted_out())
    }

    /// Persist the consent flag.
    pub async fn set_tracking_permitted(&self, permitted: bool) -> BeaconResult<()> {
        self.ensure_ready()?;
        self.store
            .set(&self.config.tracking_permitted_key, bool_str(permitted))
            .await?;
        let changed = {
            let mut cached = self.lock_cached();
            std::mem::replace(&mut cached.tracking_permitted, permitted) != permitted
        };
        if changed {
            self.notify(SettingsProperty::TrackingPermitted);
        }
        Ok(())
    }

    pub fn sample_rate(&self) -> BeaconResult<u32> {
        self.ensure_ready()?;
        Ok(self.lock_cached().sample_rate)
    }

    /// Set the sample rate in percent (1..=100). Held in memory only.
    pub fn set_sample_rate(&self, rate: u32) -> BeaconResult<()> {
        self.ensure_ready()?;
        if !(1..=100).contains(&rate) {
            return Err(SettingsError::InvalidSampleRate { rate }.into());
        }
        let changed = {
            let mut cached = self.lock_cached();
            std::mem::replace(&mut cached.sample_rate, rate) != rate
        };
        if changed {
            self.notify(SettingsProperty::SampleRate);
        }
        Ok(())
    }

    pub fn user_id(&self) -> BeaconResult<String> {
        self.ensure_ready()?;
        Ok(self.lock_cached().user_id.clone())
    }

    /// Replace the user id with a freshly generated one and persist it.
    pub async fn reset_user_id(&self) -> BeaconResult<String> {
        self.ensure_ready()?;
        let fresh = user_id::generate();
        self.store.set(&self.config.user_id_key, &fresh).await?;
        self.lock_cached().user_id = fresh.clone();
        self.notify(SettingsProperty::UserId);
        Ok(fresh)
    }

    fn ensure_ready(&self) -> BeaconResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(SettingsError::NotReady.into())
        }
    }

    async fn load_tracking_permitted(&self) -> BeaconResult<bool> {
        let raw = self.store.get(&self.config.tracking_permitted_key).await?;
        Ok(parse_permitted(raw.as_deref()))
    }

    async fn load_user_id(&self) -> BeaconResult<String> {
        match self.store.get(&self.config.user_id_key).await? {
            Some(id) if user_id::is_valid(&id) => Ok(id),
            _ => {
                let fresh = user_id::generate();
                self.store.set(&self.config.user_id_key, &fresh).await?;
                tracing::debug!("settings: generated new user id");
                Ok(fresh)
            }
        }
    }

    /// Re-read both persisted values after an outside change and notify for
    /// whichever differ from the cache.
    async fn reload(&self) -> BeaconResult<()> {
        let permitted = self.load_tracking_permitted().await?;
        let stored_id = self
            .store
            .get(&self.config.user_id_key)
            .await?
            .filter(|id| user_id::is_valid(id));

        let mut changed = Vec::new();
        {
            let mut cached = self.lock_cached();
            if cached.tracking_permitted != permitted {
                cached.tracking_permitted = permitted;
                changed.push(SettingsProperty::TrackingPermitted);
            }
            if let Some(id) = stored_id {
                if cached.user_id != id {
                    cached.user_id = id;
                    changed.push(SettingsProperty::UserId);
                }
            }
        }
        for property in changed {
            tracing::debug!(%property, "settings: changed outside this context");
            self.notify(property);
        }
        Ok(())
    }

    fn is_watched_key(&self, key: &str) -> bool {
        key == self.config.tracking_permitted_key || key == self.config.user_id_key
    }

    fn notify(&self, property: SettingsProperty) {
        // Snapshot so listeners run without the lock held.
        let listeners: Vec<ChangeListener> = self.lock_listeners().clone();
        for listener in listeners {
            listener(property);
        }
    }

    fn lock_cached(&self) -> MutexGuard<'_, Cached> {
        self.cached.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<ChangeListener>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("state", &self.ready_state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn spawn_watcher(settings: Weak<ServiceSettings>, mut changes: broadcast::Receiver<StorageChange>) {
    tokio::spawn(async move {
        loop {
            let relevant = match changes.recv().await {
                Ok(change) => match settings.upgrade() {
                    Some(s) => s.is_watched_key(&change.key),
                    None => break,
                },
                // Missed notifications: reload to be safe.
                Err(broadcast::error::RecvError::Lagged(_)) => true,
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if !relevant {
                continue;
            }
            let Some(s) = settings.upgrade() else { break };
            if let Err(e) = s.reload().await {
                tracing::warn!(error = %e, "settings: reload after outside change failed");
            }
        }
    });
}

/// Unset or unparseable means permitted.
fn parse_permitted(raw: Option<&str>) -> bool {
    raw.and_then(|s| s.trim().parse::<bool>().ok()).unwrap_or(true)
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

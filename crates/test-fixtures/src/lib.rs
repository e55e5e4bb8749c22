//! Shared test doubles for the Beacon workspace: a manual clock, a recording
//! channel, a recording transport, and helpers for building ready settings
//! and client ids with a chosen sampling segment.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use beacon_core::config::SettingsConfig;
use beacon_core::errors::{BeaconResult, ChannelError};
use beacon_core::traits::{IChannel, IClock, ITransport};
use beacon_core::{HitType, ParameterMap, SendResult, SendStatus};
use beacon_settings::{MemoryStore, ServiceSettings};

/// Store key of the user id under the default settings config.
pub const USER_ID_KEY: &str = "analytics.user-id";

/// Store key of the consent flag under the default settings config.
pub const PERMITTED_KEY: &str = "analytics.tracking-permitted";

// ─── Clock ─────────────────────────────────────────────────

/// Virtual clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl IClock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ─── Channel ───────────────────────────────────────────────

/// Terminal channel that records every hit and resolves with a fixed status.
#[derive(Debug)]
pub struct RecordingChannel {
    hits: Mutex<Vec<(HitType, ParameterMap)>>,
    status: SendStatus,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Self::with_status(SendStatus::Sent)
    }

    pub fn with_status(status: SendStatus) -> Arc<Self> {
        Arc::new(Self {
            hits: Mutex::new(Vec::new()),
            status,
        })
    }

    pub fn hits(&self) -> Vec<(HitType, ParameterMap)> {
        self.hits.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.hits.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<(HitType, ParameterMap)> {
        self.hits.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl IChannel for RecordingChannel {
    async fn send(&self, hit_type: HitType, parameters: ParameterMap) -> BeaconResult<SendResult> {
        self.hits.lock().unwrap().push((hit_type, parameters));
        Ok(SendResult::with_status(self.status))
    }
}

// ─── Transport ─────────────────────────────────────────────

/// Transport that records POSTs instead of making them.
#[derive(Debug)]
pub struct RecordingTransport {
    online: AtomicBool,
    fail: AtomicBool,
    posts: Mutex<Vec<(String, String)>>,
    attempts: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            online: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            posts: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Make every POST fail with a delivery error.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Successful POSTs as `(url, body)`.
    pub fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ITransport for RecordingTransport {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    async fn post(&self, url: &str, body: String) -> BeaconResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChannelError::Delivery {
                reason: "HTTP 503".to_string(),
            }
            .into());
        }
        self.posts.lock().unwrap().push((url.to_string(), body));
        Ok(())
    }
}

// ─── Settings ──────────────────────────────────────────────

/// A UUIDv4-shaped client id whose second segment is `segment`.
pub fn client_id_with_segment(segment: u16) -> String {
    format!("6f1c7a2e-{segment:04x}-4b7d-9a55-0123456789ab")
}

/// Settings loaded from a fresh memory store with the given user id.
pub async fn ready_settings_with_user(user_id: &str) -> (Arc<ServiceSettings>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_values([(USER_ID_KEY, user_id)]));
    let settings = ServiceSettings::spawn(store.clone(), SettingsConfig::default(), None);
    settings.when_ready().await.unwrap();
    (settings, store)
}

/// Settings loaded from a fresh, empty memory store.
pub async fn ready_settings() -> (Arc<ServiceSettings>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let settings = ServiceSettings::spawn(store.clone(), SettingsConfig::default(), None);
    settings.when_ready().await.unwrap();
    (settings, store)
}

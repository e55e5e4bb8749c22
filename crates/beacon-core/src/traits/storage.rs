use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::errors::BeaconResult;

/// A key changed in the store, possibly written by another process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
    pub new_value: Option<String>,
}

/// Persisted string key/value store backing the settings.
#[async_trait]
pub trait IKeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> BeaconResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> BeaconResult<()>;

    /// Notifications for every change to the store, whoever made it.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

use async_trait::async_trait;

use crate::errors::BeaconResult;

/// Outbound delivery of encoded hits.
#[async_trait]
pub trait ITransport: Send + Sync {
    /// Whether the device currently believes it has network access.
    fn is_online(&self) -> bool;

    /// POST `body` (an URL-encoded query string) to `url`. One attempt, no retry.
    async fn post(&self, url: &str, body: String) -> BeaconResult<()>;
}

//! Send results: the outcome every channel resolves with.

use serde::{Deserialize, Serialize};

/// Outcome of a send. Only `Sent` means the hit reached the endpoint (or the
/// disabled no-op sink); every other status is "accepted, not delivered".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendStatus {
    Sent,
    RateLimited,
    SampledOut,
    DeviceOffline,
    PayloadTooBig,
    /// A filter canceled the hit.
    Canceled,
    /// Held until settings finish loading, then replayed.
    Queued,
}

/// Extra information attached to some statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultDetails {
    PayloadSize { actual: usize, max: usize },
}

/// Result descriptor resolved by every channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    pub status: SendStatus,
    pub details: Option<ResultDetails>,
}

impl SendResult {
    pub fn with_status(status: SendStatus) -> Self {
        Self {
            status,
            details: None,
        }
    }

    pub fn sent() -> Self {
        Self::with_status(SendStatus::Sent)
    }

    pub fn payload_too_big(actual: usize, max: usize) -> Self {
        Self {
            status: SendStatus::PayloadTooBig,
            details: Some(ResultDetails::PayloadSize { actual, max }),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.status == SendStatus::Sent
    }
}

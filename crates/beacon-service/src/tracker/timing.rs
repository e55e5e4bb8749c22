use beacon_core::errors::BeaconResult;
use beacon_core::SendResult;

use super::ServiceTracker;

/// A running stopwatch bound to a tracker.
#[derive(Debug)]
pub struct Timing<'a> {
    tracker: &'a ServiceTracker,
    category: String,
    variable: String,
    started_at: i64,
}

impl<'a> Timing<'a> {
    pub(super) fn start(tracker: &'a ServiceTracker, category: &str, variable: &str) -> Self {
        Self {
            tracker,
            category: category.to_string(),
            variable: variable.to_string(),
            started_at: tracker.now_millis(),
        }
    }

    /// Milliseconds since the stopwatch started.
    pub fn elapsed_ms(&self) -> i64 {
        (self.tracker.now_millis() - self.started_at).max(0)
    }

    /// Stop and send a timing hit with the elapsed time.
    pub async fn send(self, label: Option<&str>) -> BeaconResult<SendResult> {
        let elapsed = self.elapsed_ms();
        self.tracker
            .send_timing(&self.category, &self.variable, elapsed, label)
            .await
    }
}

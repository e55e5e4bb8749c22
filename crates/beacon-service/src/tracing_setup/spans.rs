//! Span definitions for hit delivery and pre-ready replay.

/// Create a span around one hit on its way through the pipeline.
#[macro_export]
macro_rules! send_span {
    ($hit_type:expr) => {
        tracing::info_span!("beacon.send", hit_type = %$hit_type)
    };
}

/// Create a span around the replay of hits buffered before settings loaded.
#[macro_export]
macro_rules! replay_span {
    ($pending:expr, $enabled:expr) => {
        tracing::info_span!("beacon.replay", pending = $pending, enabled = $enabled)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SEND: &str = "beacon.send";
    pub const REPLAY: &str = "beacon.replay";
}

//! # beacon-service
//!
//! The public face of Beacon. [`AnalyticsService`] owns the settings, the
//! [`ChannelManager`] registry and the [`ServiceChannel`] that holds hits
//! back until settings are loaded. Trackers created from one service share
//! that channel, and with it the token bucket and the filter list.

pub mod channel_manager;
pub mod filters;
pub mod service;
pub mod service_channel;
pub mod tracing_setup;
pub mod tracker;
pub mod transport;

pub use channel_manager::{ChannelManager, EnabledChannelBuilder};
pub use filters::EventLabelerBuilder;
pub use service::{AnalyticsService, AnalyticsServiceBuilder, AppInfo};
pub use service_channel::{ChannelState, ServiceChannel};
pub use tracker::{ServiceTracker, Timing};
pub use transport::ReqwestTransport;

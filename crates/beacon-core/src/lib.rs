//! # beacon-core
//!
//! Foundation crate for the Beacon telemetry pipeline.
//! Defines parameters, hits, send results, the channel/storage/transport
//! traits, errors, and config. Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod hit;
pub mod parameter;
pub mod result;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::BeaconConfig;
pub use errors::{BeaconError, BeaconResult};
pub use hit::{Hit, HitType};
pub use parameter::{KnownParameter, ParamRef, Parameter, ParameterMap, Value, ValueType};
pub use result::{ResultDetails, SendResult, SendStatus};

//! # beacon-settings
//!
//! Persisted settings shared by every tracker of a service: consent
//! (tracking permitted), sample rate, and the anonymous user id.
//!
//! Loading is asynchronous. Until the ready signal fires, every accessor
//! except [`ServiceSettings::when_ready`] and
//! [`ServiceSettings::add_change_listener`] fails with `SettingsError::NotReady`.

pub mod listener;
pub mod settings;
pub mod store;
pub mod user_id;

pub use listener::{ChangeListener, SettingsProperty};
pub use settings::{ReadyState, ServiceSettings};
pub use store::{MemoryStore, SqliteStore};

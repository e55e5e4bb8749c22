//! Change notification plumbing.

use std::fmt;
use std::sync::Arc;

/// Observable settings properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsProperty {
    TrackingPermitted,
    SampleRate,
    UserId,
}

impl fmt::Display for SettingsProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettingsProperty::TrackingPermitted => "tracking_permitted",
            SettingsProperty::SampleRate => "sample_rate",
            SettingsProperty::UserId => "user_id",
        };
        f.write_str(name)
    }
}

/// Called synchronously with the property that changed. Listeners may
/// register further listeners; those hear from the next change on.
pub type ChangeListener = Arc<dyn Fn(SettingsProperty) + Send + Sync>;

/// Settings lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings accessed before they finished loading")]
    NotReady,

    #[error("settings failed to load: {reason}")]
    LoadFailed { reason: String },

    #[error("sample rate {rate} outside 1..=100")]
    InvalidSampleRate { rate: u32 },
}

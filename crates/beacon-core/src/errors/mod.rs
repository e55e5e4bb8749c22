mod channel_error;
mod config_error;
mod filter_error;
mod parameter_error;
mod settings_error;
mod storage_error;

pub use channel_error::ChannelError;
pub use config_error::ConfigError;
pub use filter_error::FilterError;
pub use parameter_error::ParameterError;
pub use settings_error::SettingsError;
pub use storage_error::StorageError;

/// Convenience alias used across the workspace.
pub type BeaconResult<T> = Result<T, BeaconError>;

/// Top-level error for every fallible Beacon operation.
///
/// Policy outcomes (rate limited, sampled out, offline, payload too big) are
/// never errors; they travel as [`crate::SendResult`] statuses.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("parameter error: {0}")]
    Parameter(#[from] ParameterError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("filter error: {0}")]
    Filter(#[from] FilterError),
}

impl BeaconError {
    /// Whether this error indicates API misuse rather than an environmental
    /// failure (storage I/O, network delivery).
    pub fn is_programmer_error(&self) -> bool {
        match self {
            BeaconError::Storage(_) => false,
            BeaconError::Settings(SettingsError::LoadFailed { .. }) => false,
            BeaconError::Channel(ChannelError::Delivery { .. }) => false,
            _ => true,
        }
    }
}

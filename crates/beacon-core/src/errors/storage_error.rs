/// Persisted key/value store errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("read of {key} failed: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("write of {key} failed: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("SQLite error: {message}")]
    SqliteError { message: String },
}

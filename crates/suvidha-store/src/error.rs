/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes failed their integrity check or could not be framed.
    #[error("corrupt value for key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// A conditional write lost against a newer value.
    #[error("version conflict on key {key}: expected {expected}, found {actual}")]
    Conflict {
        key: String,
        expected: u64,
        actual: u64,
    },

    /// Keys must be non-empty and use only `[A-Za-z0-9._-]`.
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// Backend cannot serve requests (e.g. a poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

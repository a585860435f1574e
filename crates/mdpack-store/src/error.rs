use std::path::PathBuf;

/// Errors from fingerprint store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A persisted generation exists but cannot be read or parsed.
    #[error("fingerprint store unavailable at {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    /// Promoting the staged generation failed. The committed generation is
    /// left as it was.
    #[error("commit failed: {0}")]
    CommitFailed(String),

    /// Serialization failure while writing a generation.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

//! Error types for the index crate.

use std::path::PathBuf;

/// Errors that abort a detection pass.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The project root does not exist or is not a directory.
    #[error("project root not found: {0}")]
    ProjectRootMissing(PathBuf),

    /// The fingerprint worker pool could not be started.
    #[error("worker pool error: {0}")]
    WorkerPool(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] mdpack_store::StoreError),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;

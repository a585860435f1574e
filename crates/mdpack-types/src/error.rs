use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("path {path} is not inside {root}")]
    OutsideRoot { path: String, root: String },

    #[error("invalid artifact path: {0}")]
    InvalidPath(String),
}

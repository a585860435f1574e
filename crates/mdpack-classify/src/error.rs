use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("cannot read {path} for content sniffing: {source}")]
    Sniff {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot list bundle directory {path}: {source}")]
    BundleListing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ClassifyResult<T> = Result<T, ClassifyError>;

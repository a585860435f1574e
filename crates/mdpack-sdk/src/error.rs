use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] mdpack_store::StoreError),

    #[error("detection error: {0}")]
    Index(#[from] mdpack_index::IndexError),

    #[error("packaging error: {0}")]
    Pack(#[from] mdpack_pack::PackError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;

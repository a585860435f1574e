use mdpack_types::ArtifactPath;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("no companion descriptor for {artifact} and no template for .{extension}")]
    MetadataUnavailable {
        artifact: ArtifactPath,
        extension: String,
    },

    #[error("failed to place {artifact}: {source}")]
    Copy {
        artifact: ArtifactPath,
        #[source]
        source: std::io::Error,
    },

    #[error("archive write failed: {0}")]
    ArchiveWriteFailed(String),

    #[error("invalid resource name: {0:?}")]
    InvalidResourceName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PackResult<T> = Result<T, PackError>;

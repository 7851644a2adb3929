use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no codec for {}", .0.display())]
    Unsupported(PathBuf),

    #[error("tag error: {0}")]
    Tag(#[from] lofty::error::LoftyError),

    #[error("track {index} not found in {}", path.display())]
    TrackNotFound { path: PathBuf, index: String },
}

impl CodecError {
    /// Whether the error means "this track does not exist" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            CodecError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            CodecError::Unsupported(_) | CodecError::TrackNotFound { .. } => true,
            CodecError::Tag(_) => false,
        }
    }
}

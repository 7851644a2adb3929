use std::path::PathBuf;

use thiserror::Error;

use crate::{
    codec::error::CodecError,
    domain::id::{IdError, SongId},
};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown source kind {0:?}")]
    UnknownSourceKind(String),

    #[error("source kind {0:?} is already registered")]
    DuplicateSourceKind(String),

    #[error("cannot open library root {}: {source}", path.display())]
    InvalidRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error while walking directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("song {0} not found")]
    SongNotFound(SongId),

    #[error("invalid song id: {0}")]
    InvalidSongId(#[from] IdError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

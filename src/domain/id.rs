use std::{
    borrow::Cow,
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Separates the encoded path from the encoded index.
///
/// Never produced by the base64url alphabet.
const SEPARATOR: char = '.';

#[derive(Debug, Error)]
pub enum IdError {
    #[error("malformed id {0:?}")]
    Malformed(String),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Identifies one logical track: the file it lives in, and its position inside that file.
///
/// The flat form is `base64url(path) "." base64url(index)`, so any path and any index
/// survive `encode` / `decode` unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SongId {
    path: PathBuf,
    index: String,
}

impl SongId {
    pub fn new(path: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            index: index.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{SEPARATOR}{}",
            URL_SAFE_NO_PAD.encode(path_to_bytes(&self.path)),
            URL_SAFE_NO_PAD.encode(self.index.as_bytes())
        )
    }

    pub fn decode(encoded: &str) -> Result<Self, IdError> {
        let (path, index) = encoded
            .split_once(SEPARATOR)
            .ok_or_else(|| IdError::Malformed(encoded.to_string()))?;

        let path = path_from_bytes(URL_SAFE_NO_PAD.decode(path)?)?;
        let index = String::from_utf8(URL_SAFE_NO_PAD.decode(index)?)?;

        Ok(Self { path, index })
    }
}

impl Display for SongId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for SongId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for SongId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(unix)]
pub(crate) fn path_to_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(unix)]
pub(crate) fn path_from_bytes(bytes: Vec<u8>) -> Result<PathBuf, IdError> {
    use std::os::unix::ffi::OsStringExt;
    Ok(PathBuf::from(std::ffi::OsString::from_vec(bytes)))
}

// Paths that are not valid unicode are encoded lossily here.
#[cfg(not(unix))]
pub(crate) fn path_to_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(not(unix))]
pub(crate) fn path_from_bytes(bytes: Vec<u8>) -> Result<PathBuf, IdError> {
    Ok(PathBuf::from(String::from_utf8(bytes)?))
}

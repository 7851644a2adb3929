use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Serialize;

use super::id::{IdError, SongId, path_from_bytes, path_to_bytes};

/// Route of the cover delivery endpoint, and prefix of every cover token.
pub const COVER_ROUTE: &str = "/cover/";

/// All songs of one source, keyed by id.
pub type Catalog = BTreeMap<SongId, SongInfo>;

/// Metadata of one logical track as a codec reports it.
///
/// Empty strings mean the tag is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMeta {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub track: Option<u32>,
    pub duration_secs: Option<f64>,
}

/// A song in the catalog, as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongInfo {
    pub title: String,
    pub album: String,
    pub artist: String,
    pub track: Option<u32>,
    pub duration_secs: Option<f64>,
    pub cover: Option<CoverRef>,
}

impl From<TrackMeta> for SongInfo {
    fn from(meta: TrackMeta) -> Self {
        Self {
            title: meta.title,
            album: meta.album,
            artist: meta.artist,
            track: meta.track,
            duration_secs: meta.duration_secs,
            cover: None,
        }
    }
}

/// Opaque reference to a cover image, resolved by the cover endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CoverRef(String);

impl CoverRef {
    pub fn from_path(path: &Path) -> Self {
        Self(format!(
            "{COVER_ROUTE}{}",
            URL_SAFE_NO_PAD.encode(path_to_bytes(path))
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after [`COVER_ROUTE`].
    pub fn token(&self) -> &str {
        self.0.strip_prefix(COVER_ROUTE).unwrap_or(&self.0)
    }

    /// Resolves a token taken from a cover request back into the image path.
    pub fn decode_token(token: &str) -> Result<PathBuf, IdError> {
        path_from_bytes(URL_SAFE_NO_PAD.decode(token)?)
    }
}

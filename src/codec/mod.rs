//! Decoders that turn audio files into logical tracks

use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

use log::debug;

use crate::domain::song::TrackMeta;

pub mod error;
pub mod tags;

use error::CodecError;
use tags::TagCodec;

/// A readable, seekable byte stream handed out for one track.
pub trait MediaStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> MediaStream for T {}

/// Deferred access to a file's bytes. Nothing is opened until `open` is called.
pub trait StreamOpener {
    /// Returns the stream and its length in bytes.
    fn open(&self) -> std::io::Result<(Box<dyn MediaStream>, u64)>;
}

/// Opens a file on disk when asked to.
pub struct FileOpener<'a> {
    path: &'a Path,
}

impl<'a> FileOpener<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }
}

impl StreamOpener for FileOpener<'_> {
    fn open(&self) -> std::io::Result<(Box<dyn MediaStream>, u64)> {
        debug!("open file {}", self.path.to_string_lossy());
        let file = File::open(self.path)?;
        let len = file.metadata()?.len();
        Ok((Box::new(file), len))
    }
}

/// A decoder for one family of audio formats.
pub trait Codec: Send + Sync {
    /// Lowercase file extensions this codec handles, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Lists the logical tracks in the stream. May return an empty list.
    fn probe(&self, path: &Path, opener: &dyn StreamOpener) -> Result<Vec<TrackMeta>, CodecError>;

    /// Opens the track at `index`, as numbered by `probe`.
    fn open_track(
        &self,
        path: &Path,
        index: &str,
        opener: &dyn StreamOpener,
    ) -> Result<Box<dyn MediaStream>, CodecError>;
}

/// Picks a codec by file extension.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: Vec<Box<dyn Codec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every codec this crate ships.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TagCodec);
        registry
    }

    /// Adds a codec. Earlier codecs win when extensions overlap.
    pub fn register(&mut self, codec: impl Codec + 'static) {
        self.codecs.push(Box::new(codec));
    }

    pub fn for_path(&self, path: &Path) -> Option<&dyn Codec> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        self.codecs
            .iter()
            .find(|codec| codec.extensions().contains(&ext.as_str()))
            .map(|codec| &**codec)
    }

    /// Returns `None` when no codec applies to the file.
    pub fn probe(
        &self,
        path: &Path,
        opener: &dyn StreamOpener,
    ) -> Result<Option<Vec<TrackMeta>>, CodecError> {
        match self.for_path(path) {
            Some(codec) => codec.probe(path, opener).map(Some),
            None => Ok(None),
        }
    }

    pub fn open_track(
        &self,
        path: &Path,
        index: &str,
        opener: &dyn StreamOpener,
    ) -> Result<Box<dyn MediaStream>, CodecError> {
        let codec = self
            .for_path(path)
            .ok_or_else(|| CodecError::Unsupported(path.to_path_buf()))?;
        codec.open_track(path, index, opener)
    }
}

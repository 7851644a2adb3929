//! Single-track audio files, described by their tags

use std::path::Path;

use lofty::{
    file::{AudioFile, TaggedFileExt},
    probe::Probe,
    tag::Accessor,
};

use crate::{
    codec::{Codec, MediaStream, StreamOpener, error::CodecError},
    domain::song::TrackMeta,
};

const TAGGED_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "opus", "m4a", "mp4", "aac", "wav", "aiff", "aif", "wv", "ape",
];

/// Reads tags with lofty. Every file holds exactly one track, index `"0"`.
pub struct TagCodec;

const ONLY_TRACK: &str = "0";

impl Codec for TagCodec {
    fn extensions(&self) -> &'static [&'static str] {
        TAGGED_EXTENSIONS
    }

    fn probe(&self, _path: &Path, opener: &dyn StreamOpener) -> Result<Vec<TrackMeta>, CodecError> {
        let (stream, _len) = opener.open()?;
        let tagged_file = Probe::new(stream).guess_file_type()?.read()?;

        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag());

        let title = tag.and_then(|t| t.title().map(|s| s.into_owned()));
        let artist = tag.and_then(|t| t.artist().map(|s| s.into_owned()));
        let album = tag.and_then(|t| t.album().map(|s| s.into_owned()));
        let track = tag.and_then(|t| t.track());

        let duration = tagged_file.properties().duration();

        Ok(vec![TrackMeta {
            title: title.unwrap_or_default(),
            artist: artist.unwrap_or_default(),
            album: album.unwrap_or_default(),
            track,
            duration_secs: (!duration.is_zero()).then(|| duration.as_secs_f64()),
        }])
    }

    fn open_track(
        &self,
        path: &Path,
        index: &str,
        opener: &dyn StreamOpener,
    ) -> Result<Box<dyn MediaStream>, CodecError> {
        if index != ONLY_TRACK {
            return Err(CodecError::TrackNotFound {
                path: path.to_path_buf(),
                index: index.to_string(),
            });
        }
        let (stream, _len) = opener.open()?;
        Ok(stream)
    }
}

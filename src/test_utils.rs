//! Test doubles shared by the unit tests

use std::{
    io::{Cursor, Read},
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    codec::{Codec, CodecRegistry, MediaStream, StreamOpener, error::CodecError},
    domain::song::{Catalog, TrackMeta},
    library::{
        error::LibraryError,
        scan::{DirectoryScanner, Scanner},
        source::Source,
    },
};

/// Decodes `.fake` files: one track per line, each line `title|album`.
///
/// An empty file has no tracks. A file starting with `!` fails to decode.
/// A track's stream is its line.
pub struct FakeCodec;

impl FakeCodec {
    fn read_lines(opener: &dyn StreamOpener) -> Result<Vec<String>, CodecError> {
        let (mut stream, _) = opener.open()?;
        let mut contents = String::new();
        stream.read_to_string(&mut contents)?;
        if contents.starts_with('!') {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, contents).into());
        }
        Ok(contents.lines().map(str::to_string).collect())
    }
}

impl Codec for FakeCodec {
    fn extensions(&self) -> &'static [&'static str] {
        &["fake"]
    }

    fn probe(&self, _path: &Path, opener: &dyn StreamOpener) -> Result<Vec<TrackMeta>, CodecError> {
        Ok(Self::read_lines(opener)?
            .iter()
            .map(|line| {
                let (title, album) = line.split_once('|').unwrap_or((line.as_str(), ""));
                TrackMeta {
                    title: title.to_string(),
                    album: album.to_string(),
                    ..Default::default()
                }
            })
            .collect())
    }

    fn open_track(
        &self,
        path: &Path,
        index: &str,
        opener: &dyn StreamOpener,
    ) -> Result<Box<dyn MediaStream>, CodecError> {
        let lines = Self::read_lines(opener)?;
        index
            .parse::<usize>()
            .ok()
            .and_then(|i| lines.into_iter().nth(i))
            .map(|line| Box::new(Cursor::new(line.into_bytes())) as Box<dyn MediaStream>)
            .ok_or_else(|| CodecError::TrackNotFound {
                path: path.to_path_buf(),
                index: index.to_string(),
            })
    }
}

pub fn fake_codecs() -> CodecRegistry {
    let mut codecs = CodecRegistry::new();
    codecs.register(FakeCodec);
    codecs
}

/// Writes the file, creating parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// A valid, untagged, silent 16-bit mono PCM wav file.
pub fn wav_bytes(samples: u32) -> Vec<u8> {
    let data_len = samples * 2;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // channels
    bytes.extend_from_slice(&8000u32.to_le_bytes()); // sample rate
    bytes.extend_from_slice(&16000u32.to_le_bytes()); // byte rate
    bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
    bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, 0);
    bytes
}

#[derive(Clone, Default)]
pub struct ScanCount(Arc<AtomicUsize>);

impl ScanCount {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Directory scanner over [`FakeCodec`] files that counts its scans.
pub struct CountingScanner {
    inner: DirectoryScanner,
    count: ScanCount,
}

impl CountingScanner {
    pub fn new() -> Self {
        Self {
            inner: DirectoryScanner::new(Arc::new(fake_codecs())),
            count: ScanCount::default(),
        }
    }
}

impl Scanner for CountingScanner {
    fn scan(&self, root: &Path) -> Result<Catalog, LibraryError> {
        self.count.0.fetch_add(1, Ordering::SeqCst);
        self.inner.scan(root)
    }
}

pub fn counting_source(root: &Path) -> (Source<CountingScanner>, ScanCount) {
    let scanner = CountingScanner::new();
    let count = scanner.count.clone();
    let source = Source::with_scanner(root.to_path_buf(), scanner, Arc::new(fake_codecs()));
    (source, count)
}

//! Second scan pass: decode every file and build the catalog

use std::path::Path;

use log::debug;

use crate::{
    codec::{CodecRegistry, FileOpener},
    domain::{
        id::SongId,
        song::{Catalog, SongInfo, TrackMeta},
    },
    library::{covers::CoverIndex, error::LibraryError, walk},
};

/// Walks the tree and catalogs every track the codecs recognize.
///
/// Files that cannot be opened or decoded are left out. Only a failure of the
/// walk itself is an error.
pub fn build_catalog(
    root: &Path,
    covers: &CoverIndex,
    codecs: &CodecRegistry,
) -> Result<Catalog, LibraryError> {
    let mut catalog = Catalog::new();

    for entry in walk(root) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();

        let tracks = match codecs.probe(path, &FileOpener::new(path)) {
            Ok(Some(tracks)) if !tracks.is_empty() => tracks,
            Ok(_) => continue,
            Err(e) => {
                debug!("skipping {}: {e}", path.to_string_lossy());
                continue;
            }
        };

        add_tracks(&mut catalog, path, tracks, covers);
    }

    Ok(catalog)
}

/// Fills in missing titles and albums, attaches the directory cover and assigns ids.
fn add_tracks(catalog: &mut Catalog, path: &Path, tracks: Vec<TrackMeta>, covers: &CoverIndex) {
    let file_name = base_name(path);
    let dir = path.parent();
    let several = tracks.len() > 1;

    for (index, meta) in tracks.into_iter().enumerate() {
        let mut info = SongInfo::from(meta);

        if info.title.is_empty() {
            info.title = if several {
                format!("{file_name}:{index}")
            } else {
                file_name.clone()
            };
        }
        if info.album.is_empty() {
            info.album = dir.map(base_name).unwrap_or_default();
        }
        if let Some(cover) = dir.and_then(|dir| covers.get(dir)) {
            info.cover = Some(cover.clone());
        }

        catalog.insert(SongId::new(path, index.to_string()), info);
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::{
        codec::CodecRegistry,
        domain::id::SongId,
        library::{catalog::build_catalog, covers::find_covers, error::LibraryError},
        test_utils::{fake_codecs, write_file},
    };

    #[test]
    fn no_audio_files_gives_empty_catalog() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("notes.txt"), "hello");
        write_file(&tmp.path().join("sub/cover.jpg"), "img");

        let catalog = build_catalog(tmp.path(), &Default::default(), &fake_codecs()).unwrap();

        assert!(catalog.is_empty());
    }

    #[test]
    fn tagged_tracks_keep_their_metadata() {
        let tmp = TempDir::new().unwrap();
        let song = tmp.path().join("Album/song.fake");
        write_file(&song, "Real Title|Real Album");

        let catalog = build_catalog(tmp.path(), &Default::default(), &fake_codecs()).unwrap();

        let info = &catalog[&SongId::new(&song, "0")];
        assert_eq!(info.title, "Real Title");
        assert_eq!(info.album, "Real Album");
    }

    #[test]
    fn missing_title_and_album_come_from_the_path() {
        let tmp = TempDir::new().unwrap();
        let song = tmp.path().join("Some Album/song.fake");
        write_file(&song, "|");

        let catalog = build_catalog(tmp.path(), &Default::default(), &fake_codecs()).unwrap();

        let info = &catalog[&SongId::new(&song, "0")];
        assert_eq!(info.title, "song.fake");
        assert_eq!(info.album, "Some Album");
    }

    #[test]
    fn multi_track_titles_get_positional_suffix() {
        let tmp = TempDir::new().unwrap();
        let song = tmp.path().join("dir/song.fake");
        write_file(&song, "|\n|");

        let catalog = build_catalog(tmp.path(), &Default::default(), &fake_codecs()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[&SongId::new(&song, "0")].title, "song.fake:0");
        assert_eq!(catalog[&SongId::new(&song, "1")].title, "song.fake:1");
    }

    #[test]
    fn covers_attach_only_within_their_directory() {
        let tmp = TempDir::new().unwrap();
        let covered = tmp.path().join("a/song.fake");
        let bare = tmp.path().join("b/song.fake");
        write_file(&tmp.path().join("a/Cover.JPG"), "img");
        write_file(&covered, "|");
        write_file(&bare, "|");

        let covers = find_covers(tmp.path()).unwrap();
        let catalog = build_catalog(tmp.path(), &covers, &fake_codecs()).unwrap();

        let cover = catalog[&SongId::new(&covered, "0")].cover.as_ref();
        assert!(cover.is_some_and(|c| !c.as_str().is_empty()));
        assert!(catalog[&SongId::new(&bare, "0")].cover.is_none());
    }

    #[test]
    fn rejected_and_empty_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.fake");
        write_file(&good, "|");
        write_file(&tmp.path().join("broken.fake"), "!corrupt");
        write_file(&tmp.path().join("empty.fake"), "");
        write_file(&tmp.path().join("other.txt"), "text");

        let catalog = build_catalog(tmp.path(), &Default::default(), &fake_codecs()).unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains_key(&SongId::new(&good, "0")));
    }

    #[test]
    fn empty_registry_catalogs_nothing() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("song.fake"), "|");

        let catalog = build_catalog(tmp.path(), &Default::default(), &CodecRegistry::new()).unwrap();

        assert!(catalog.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = build_catalog(&tmp.path().join("missing"), &Default::default(), &fake_codecs());
        assert!(matches!(result, Err(LibraryError::Walk(_))));
    }
}

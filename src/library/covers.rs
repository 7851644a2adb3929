//! First scan pass: find the cover image of every directory

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    domain::song::CoverRef,
    library::{error::LibraryError, walk},
};

const COVER_NAMES: &[&str] = &["cover", "folder"];
const COVER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Directory → cover of that directory. Lives for one scan.
pub type CoverIndex = HashMap<PathBuf, CoverRef>;

/// `cover` or `folder`, dot, `jpg`/`jpeg`/`png`. Case-insensitive, whole file name.
pub fn is_cover_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let name = name.to_lowercase();

    name.rsplit_once('.')
        .map(|(stem, ext)| COVER_NAMES.contains(&stem) && COVER_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Walks the tree and records a cover for each directory holding one.
///
/// Entries are visited in file name order, so when a directory holds several
/// covers the one sorting last wins.
pub fn find_covers(root: &Path) -> Result<CoverIndex, LibraryError> {
    let mut covers = CoverIndex::new();

    for entry in walk(root) {
        let entry = entry?;
        if entry.file_type().is_dir() || !is_cover_file(entry.path()) {
            continue;
        }
        let Some(dir) = entry.path().parent() else {
            continue;
        };

        debug!("cover {}", entry.path().to_string_lossy());
        covers.insert(dir.to_path_buf(), CoverRef::from_path(entry.path()));
    }

    Ok(covers)
}

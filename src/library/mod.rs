//! Scanning music directories into catalogs, and caching them

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

pub mod catalog;
pub mod covers;
pub mod error;
pub mod scan;
pub mod source;

/// Depth-first walk of the tree, visiting directory entries in file name order.
///
/// Every pass over a tree uses this, so all passes see files in the same order.
pub(crate) fn walk(root: &Path) -> walkdir::IntoIter {
    WalkDir::new(root).sort_by_file_name().into_iter()
}

/// Whether `path` names something inside `root`, without climbing out through `..`.
pub(crate) fn is_within(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .is_ok_and(|rest| !rest.components().any(|c| c == Component::ParentDir))
}

/// Drops `.` and folds `..` into its parent, without touching the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

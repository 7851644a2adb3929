use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use anyhow::anyhow;
use log::{debug, warn};

use crate::{
    codec::{CodecRegistry, FileOpener, MediaStream},
    domain::{
        id::SongId,
        song::{Catalog, SongInfo},
    },
    library::{
        error::LibraryError,
        is_within, normalize,
        scan::{DirectoryScanner, Scanner},
    },
};

/// What a source knows about its directory.
#[derive(Debug, Clone, Default)]
pub enum CacheState {
    /// No scan has completed yet.
    #[default]
    NotScanned,
    /// Result of the latest successful scan. May be empty.
    Scanned(Arc<Catalog>),
    /// The cached catalog was dropped; the next listing rescans.
    Invalidated,
}

/// A music directory and the lazily scanned catalog of its songs.
///
/// Safe to share between threads: scans are serialized, and readers get the
/// old or the new catalog as a whole.
pub struct Source<S = DirectoryScanner> {
    root: PathBuf,
    scanner: S,
    codecs: Arc<CodecRegistry>,
    state: RwLock<CacheState>,
    scan_lock: Mutex<()>,
}

impl Source<DirectoryScanner> {
    /// Opens the directory to make sure it is usable. Nothing is scanned yet.
    pub fn open(dir: impl AsRef<Path>, codecs: Arc<CodecRegistry>) -> Result<Self, LibraryError> {
        let root = resolve_root(dir.as_ref())?;
        let scanner = DirectoryScanner::new(codecs.clone());
        Ok(Self::with_scanner(root, scanner, codecs))
    }
}

impl<S: Scanner> Source<S> {
    pub fn with_scanner(root: PathBuf, scanner: S, codecs: Arc<CodecRegistry>) -> Self {
        Self {
            root,
            scanner,
            codecs,
            state: RwLock::new(CacheState::NotScanned),
            scan_lock: Mutex::new(()),
        }
    }

    /// The root directory, which identifies the source.
    pub fn key(&self) -> &Path {
        &self.root
    }

    pub fn is_scanned(&self) -> Result<bool, LibraryError> {
        Ok(self.cached()?.is_some())
    }

    /// Cached catalog, scanning first if there is none.
    pub fn list(&self) -> Result<Arc<Catalog>, LibraryError> {
        if let Some(catalog) = self.cached()? {
            debug!("catalog of {} served from cache", self.root.to_string_lossy());
            return Ok(catalog);
        }

        let _scan = self.lock_scan()?;
        // another caller may have finished a scan while we waited
        if let Some(catalog) = self.cached()? {
            return Ok(catalog);
        }
        self.scan_and_replace()
    }

    /// Rescans unconditionally and replaces the cached catalog.
    ///
    /// On failure the previous state is kept.
    pub fn refresh(&self) -> Result<Arc<Catalog>, LibraryError> {
        let _scan = self.lock_scan()?;
        self.scan_and_replace()
    }

    /// Drops the cached catalog so the next listing rescans.
    pub fn invalidate(&self) -> Result<(), LibraryError> {
        *self.write_state()? = CacheState::Invalidated;
        Ok(())
    }

    /// Looks the song up, listing once more if it is not cached.
    pub fn info(&self, id: &SongId) -> Result<SongInfo, LibraryError> {
        if let Some(info) = self.cached()?.and_then(|catalog| catalog.get(id).cloned()) {
            return Ok(info);
        }

        match self.list()?.get(id) {
            Some(info) => Ok(info.clone()),
            None => {
                warn!("song {} not found in {}", id, self.root.to_string_lossy());
                Err(LibraryError::SongNotFound(id.clone()))
            }
        }
    }

    /// Opens the track for streaming. Works without a scan.
    pub fn get_track(&self, id: &SongId) -> Result<Box<dyn MediaStream>, LibraryError> {
        if !is_within(id.path(), &self.root) {
            return Err(LibraryError::SongNotFound(id.clone()));
        }

        self.codecs
            .open_track(id.path(), id.index(), &FileOpener::new(id.path()))
            .map_err(|e| {
                if e.is_not_found() {
                    debug!("track {id} unavailable: {e}");
                    LibraryError::SongNotFound(id.clone())
                } else {
                    LibraryError::Codec(e)
                }
            })
    }

    fn scan_and_replace(&self) -> Result<Arc<Catalog>, LibraryError> {
        let catalog = Arc::new(self.scanner.scan(&self.root)?);
        *self.write_state()? = CacheState::Scanned(catalog.clone());
        Ok(catalog)
    }

    fn cached(&self) -> Result<Option<Arc<Catalog>>, LibraryError> {
        match &*self.read_state()? {
            CacheState::Scanned(catalog) => Ok(Some(catalog.clone())),
            CacheState::NotScanned | CacheState::Invalidated => Ok(None),
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, CacheState>, LibraryError> {
        self.state
            .read()
            .map_err(|e| LibraryError::Internal(anyhow!("catalog lock poisoned: {e}")))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, CacheState>, LibraryError> {
        self.state
            .write()
            .map_err(|e| LibraryError::Internal(anyhow!("catalog lock poisoned: {e}")))
    }

    fn lock_scan(&self) -> Result<MutexGuard<'_, ()>, LibraryError> {
        self.scan_lock
            .lock()
            .map_err(|e| LibraryError::Internal(anyhow!("scan lock poisoned: {e}")))
    }
}

/// Makes the path absolute without `.` or `..` and checks that it can be
/// opened as a directory.
fn resolve_root(dir: &Path) -> Result<PathBuf, LibraryError> {
    let invalid = |source| LibraryError::InvalidRoot {
        path: dir.to_path_buf(),
        source,
    };
    let root = normalize(&std::path::absolute(dir).map_err(invalid)?);
    std::fs::read_dir(&root).map_err(invalid)?;
    Ok(root)
}

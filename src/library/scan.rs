use std::{path::Path, sync::Arc, time::Instant};

use log::info;

use crate::{
    codec::CodecRegistry,
    domain::song::Catalog,
    library::{catalog::build_catalog, covers::find_covers, error::LibraryError},
};

/// Produces a complete catalog for a directory tree, or an error and nothing.
pub trait Scanner: Send + Sync {
    fn scan(&self, root: &Path) -> Result<Catalog, LibraryError>;
}

/// Two passes over the tree: covers first, then tracks.
pub struct DirectoryScanner {
    codecs: Arc<CodecRegistry>,
}

impl DirectoryScanner {
    pub fn new(codecs: Arc<CodecRegistry>) -> Self {
        Self { codecs }
    }
}

impl Scanner for DirectoryScanner {
    fn scan(&self, root: &Path) -> Result<Catalog, LibraryError> {
        let started = Instant::now();
        info!("Scanning {}", root.to_string_lossy());

        let covers = find_covers(root)?;
        let catalog = build_catalog(root, &covers, &self.codecs)?;

        info!(
            "Scanned {}: {} songs, {} covers in {:.2?}",
            root.to_string_lossy(),
            catalog.len(),
            covers.len(),
            started.elapsed()
        );
        Ok(catalog)
    }
}

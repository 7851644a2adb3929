//! Kinds of media sources, and how to build them from configuration

use std::{collections::BTreeMap, path::Path, sync::Arc};

use crate::{
    codec::{CodecRegistry, MediaStream},
    domain::{
        id::SongId,
        song::{Catalog, SongInfo},
    },
    library::{error::LibraryError, scan::Scanner, source::Source},
};

/// Everything the rest of the application needs from a source of songs.
pub trait MediaSource: Send + Sync {
    /// Stable identity of the source.
    fn key(&self) -> String;
    fn list(&self) -> Result<Arc<Catalog>, LibraryError>;
    fn info(&self, id: &SongId) -> Result<SongInfo, LibraryError>;
    fn get_track(&self, id: &SongId) -> Result<Box<dyn MediaStream>, LibraryError>;
    fn refresh(&self) -> Result<Arc<Catalog>, LibraryError>;

    /// Root directory on disk, for sources backed by one.
    fn root(&self) -> Option<&Path> {
        None
    }
}

impl<S: Scanner> MediaSource for Source<S> {
    fn key(&self) -> String {
        Source::key(self).to_string_lossy().into_owned()
    }

    fn list(&self) -> Result<Arc<Catalog>, LibraryError> {
        Source::list(self)
    }

    fn info(&self, id: &SongId) -> Result<SongInfo, LibraryError> {
        Source::info(self, id)
    }

    fn get_track(&self, id: &SongId) -> Result<Box<dyn MediaStream>, LibraryError> {
        Source::get_track(self, id)
    }

    fn refresh(&self) -> Result<Arc<Catalog>, LibraryError> {
        Source::refresh(self)
    }

    fn root(&self) -> Option<&Path> {
        Some(Source::key(self))
    }
}

pub type Constructor =
    fn(&[String], Arc<CodecRegistry>) -> Result<Box<dyn MediaSource>, LibraryError>;

/// A registered source kind: its parameter names and its constructor.
#[derive(Clone, Copy)]
pub struct SourceKind {
    pub name: &'static str,
    pub params: &'static [&'static str],
    constructor: Constructor,
}

/// Source kinds by name. Filled once at startup by [`register_builtin`].
#[derive(Default)]
pub struct SourceRegistry {
    kinds: BTreeMap<&'static str, SourceKind>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &'static str,
        params: &'static [&'static str],
        constructor: Constructor,
    ) -> Result<(), LibraryError> {
        if self.kinds.contains_key(name) {
            return Err(LibraryError::DuplicateSourceKind(name.to_string()));
        }
        self.kinds.insert(
            name,
            SourceKind {
                name,
                params,
                constructor,
            },
        );
        Ok(())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &SourceKind> {
        self.kinds.values()
    }

    pub fn create(
        &self,
        name: &str,
        params: &[String],
        codecs: Arc<CodecRegistry>,
    ) -> Result<Box<dyn MediaSource>, LibraryError> {
        let kind = self
            .kinds
            .get(name)
            .ok_or_else(|| LibraryError::UnknownSourceKind(name.to_string()))?;

        if params.len() != kind.params.len() {
            return Err(LibraryError::Config(format!(
                "source kind {:?} expects parameters {:?}, got {}",
                kind.name,
                kind.params,
                params.len()
            )));
        }
        (kind.constructor)(params, codecs)
    }
}

/// Registers every source kind this crate provides.
pub fn register_builtin(registry: &mut SourceRegistry) -> Result<(), LibraryError> {
    registry.register("file", &["directory"], file_source)
}

fn file_source(
    params: &[String],
    codecs: Arc<CodecRegistry>,
) -> Result<Box<dyn MediaSource>, LibraryError> {
    let [directory] = params else {
        return Err(LibraryError::Config("expected one parameter".into()));
    };
    Ok(Box::new(Source::open(directory, codecs)?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::{
        domain::id::SongId,
        library::error::LibraryError,
        registry::{SourceRegistry, register_builtin},
        test_utils::{fake_codecs, write_file},
    };

    fn registry() -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        register_builtin(&mut registry).unwrap();
        registry
    }

    #[test]
    fn builtin_file_kind_is_registered() {
        let registry = registry();
        let kinds: Vec<_> = registry.kinds().map(|k| (k.name, k.params)).collect();
        assert_eq!(kinds, vec![("file", &["directory"][..])]);
    }

    #[test]
    fn registering_twice_fails() {
        let mut registry = registry();
        assert!(matches!(
            register_builtin(&mut registry),
            Err(LibraryError::DuplicateSourceKind(name)) if name == "file"
        ));
    }

    #[test]
    fn creates_file_source_and_lists_it() {
        let tmp = TempDir::new().unwrap();
        let song = tmp.path().join("a.fake");
        write_file(&song, "Title|Album");

        let source = registry()
            .create(
                "file",
                &[tmp.path().to_string_lossy().into_owned()],
                Arc::new(fake_codecs()),
            )
            .unwrap();

        assert_eq!(source.key(), tmp.path().to_string_lossy());
        assert_eq!(source.root(), Some(tmp.path()));
        assert_eq!(source.list().unwrap().len(), 1);
        assert_eq!(source.info(&SongId::new(&song, "0")).unwrap().title, "Title");
    }

    #[test]
    fn unknown_kind_fails() {
        let result = registry().create("smb", &[], Arc::new(fake_codecs()));
        assert!(matches!(result, Err(LibraryError::UnknownSourceKind(_))));
    }

    #[test]
    fn wrong_parameter_count_fails() {
        let registry = registry();
        for params in [vec![], vec!["a".to_string(), "b".to_string()]] {
            let result = registry.create("file", &params, Arc::new(fake_codecs()));
            assert!(matches!(result, Err(LibraryError::Config(_))));
        }
    }

    #[test]
    fn unopenable_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing").to_string_lossy().into_owned();

        let result = registry().create("file", &[missing], Arc::new(fake_codecs()));
        assert!(matches!(result, Err(LibraryError::InvalidRoot { .. })));
    }
}

//! Session-scoped factory handing out named sub-directories.
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path};

use tempfile::TempDir;
use tracing::debug;

use crate::dir::{TmpDir, DEFAULT_PREFIX};
use crate::error::{Result, TmpDirError};

/// Owns one base temp directory and creates sub-directories inside it.
///
/// Directories handed out by [`mktemp`](Self::mktemp) do not own their
/// paths; everything is removed when the factory drops.
///
/// ```rust
/// use tmpdir::TempDirFactory;
///
/// let factory = TempDirFactory::new().unwrap();
/// let first = factory.mktemp("data", true).unwrap();
/// let second = factory.mktemp("data", true).unwrap();
/// assert!(first.ends_with("data0"));
/// assert!(second.ends_with("data1"));
/// assert!(first.starts_with(factory.getbasetemp().path()));
/// ```
#[derive(Debug)]
pub struct TempDirFactory {
    base: TempDir,
}

impl TempDirFactory {
    pub fn new() -> Result<Self> {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: &str) -> Result<Self> {
        let base = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(TmpDirError::io(&std::env::temp_dir()))?;
        debug!(base = %base.path().display(), "tmp_dir_factory_created");
        Ok(Self { base })
    }

    /// Creates `basename0`, `basename1`, ... when `numbered`, otherwise
    /// exactly `basename`, failing with
    /// [`AlreadyExists`](TmpDirError::AlreadyExists) if it is taken.
    pub fn mktemp(&self, basename: &str, numbered: bool) -> Result<TmpDir> {
        let mut components = Path::new(basename).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(TmpDirError::InvalidName(basename.to_string()));
        }

        if !numbered {
            let path = self.base.path().join(basename);
            return match fs::create_dir(&path) {
                Ok(()) => Ok(TmpDir::at(path)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    Err(TmpDirError::AlreadyExists(path))
                }
                Err(err) => Err(TmpDirError::Io { path, source: err }),
            };
        }

        let mut n = 0usize;
        loop {
            let path = self.base.path().join(format!("{basename}{n}"));
            match fs::create_dir(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "tmp_dir_numbered");
                    return Ok(TmpDir::at(path));
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(err) => return Err(TmpDirError::Io { path, source: err }),
            }
        }
    }

    /// The base directory, as a non-owning handle.
    pub fn getbasetemp(&self) -> TmpDir {
        TmpDir::at(self.base.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnumbered_names_are_exclusive() {
        let factory = TempDirFactory::new().unwrap();
        let dir = factory.mktemp("fixed", false).unwrap();
        assert!(dir.ends_with("fixed"));
        assert!(!dir.is_owned());
        assert!(matches!(
            factory.mktemp("fixed", false),
            Err(TmpDirError::AlreadyExists(_))
        ));
    }

    #[test]
    fn numbering_skips_taken_names() {
        let factory = TempDirFactory::with_prefix("numbering-").unwrap();
        fs::create_dir(factory.getbasetemp().join("run0")).unwrap();
        let dir = factory.mktemp("run", true).unwrap();
        assert!(dir.ends_with("run1"));
    }

    #[test]
    fn basenames_must_be_single_components() {
        let factory = TempDirFactory::new().unwrap();
        for bad in ["", "a/b", "..", "/abs"] {
            assert!(matches!(
                factory.mktemp(bad, true),
                Err(TmpDirError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn base_is_removed_with_the_factory() {
        let factory = TempDirFactory::new().unwrap();
        let dir = factory.mktemp("gone", true).unwrap();
        let base = factory.getbasetemp().path().to_path_buf();
        drop(factory);
        assert!(!dir.exists());
        assert!(!base.exists());
    }
}

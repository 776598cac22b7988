//! The temp directory handle: generation, read-back and scoped `chdir`.
use std::cell::Cell;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{Result, TmpDirError};
use crate::tree::{Contents, Name, Node, Tree};

pub(crate) const DEFAULT_PREFIX: &str = "testutils-";

/// A directory to build fixtures in.
///
/// Either owns a fresh temporary directory, removed when the handle is
/// dropped, or wraps an existing path it does not clean up. Derefs to
/// [`Path`], so the usual `join`/`exists` calls work directly.
#[derive(Debug)]
pub struct TmpDir {
    path: PathBuf,
    owned: Option<TempDir>,
}

impl TmpDir {
    /// Creates a fresh directory under the system temp dir.
    pub fn new() -> Result<Self> {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: &str) -> Result<Self> {
        let owned = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(TmpDirError::io(&std::env::temp_dir()))?;
        let path = owned.path().to_path_buf();
        debug!(path = %path.display(), "tmp_dir_created");
        Ok(Self {
            path,
            owned: Some(owned),
        })
    }

    /// Wraps an existing directory without taking ownership of it.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            owned: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the directory is removed on drop.
    pub fn is_owned(&self) -> bool {
        self.owned.is_some()
    }

    /// Writes `tree` below this directory and returns its top-level names in
    /// insertion order.
    ///
    /// Parent directories are created as needed and existing files are
    /// overwritten.
    ///
    /// ```rust
    /// use tmpdir::{tree, TmpDir};
    ///
    /// let dir = TmpDir::new().unwrap();
    /// let names = dir.gen(tree! {
    ///     "conf/app.yaml" => "debug: true",
    ///     "data" => { "blob.bin" => b"\x00\x01" },
    /// }).unwrap();
    /// assert_eq!(names.len(), 2);
    /// assert_eq!(std::fs::read_to_string(dir.join("conf/app.yaml")).unwrap(), "debug: true");
    /// ```
    pub fn gen(&self, tree: impl Into<Tree>) -> Result<Vec<Name>> {
        let tree = tree.into();
        write_tree(&self.path, &tree)?;
        debug!(path = %self.path.display(), entries = tree.len(), "tree_generated");
        Ok(tree.names().cloned().collect())
    }

    /// Writes a single file.
    pub fn gen_file(&self, name: impl Into<Name>, contents: impl Into<Contents>) -> Result<Name> {
        let name = name.into();
        let tree = Tree::new().file(name.clone(), contents);
        write_tree(&self.path, &tree)?;
        Ok(name)
    }

    /// Reads the whole directory back. Entries come back sorted by name.
    pub fn read_tree(&self) -> Result<Tree> {
        read_tree(&self.path)
    }

    /// Reads the sub-directory at `relative` back.
    pub fn read_tree_at(&self, relative: impl Into<Name>) -> Result<Tree> {
        let relative = relative.into().to_relative_path()?;
        read_tree(&self.path.join(relative))
    }

    /// Makes this directory the working directory until the guard drops.
    pub fn chdir(&self) -> Result<CwdGuard> {
        CwdGuard::enter(&self.path)
    }

    /// Runs `f` with this directory as the working directory.
    ///
    /// The previous directory is restored afterwards, also when `f` panics.
    pub fn with_cwd<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
        let _guard = self.chdir()?;
        Ok(f())
    }
}

impl Deref for TmpDir {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for TmpDir {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

fn write_tree(base: &Path, tree: &Tree) -> Result<()> {
    for (name, node) in tree.entries() {
        let path = base.join(name.to_relative_path()?);
        match node {
            Node::Dir(sub) if sub.is_empty() => {
                fs::create_dir_all(&path).map_err(TmpDirError::io(&path))?;
            }
            Node::Dir(sub) => write_tree(&path, sub)?,
            Node::File(contents) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(TmpDirError::io(parent))?;
                }
                fs::write(&path, contents.as_bytes()).map_err(TmpDirError::io(&path))?;
            }
        }
    }
    Ok(())
}

fn read_tree(base: &Path) -> Result<Tree> {
    let mut tree = Tree::new();
    for entry in fs::read_dir(base).map_err(TmpDirError::io(base))? {
        let entry = entry.map_err(TmpDirError::io(base))?;
        let path = entry.path();
        let metadata = fs::metadata(&path).map_err(TmpDirError::io(&path))?;
        let name = Name::from_os_string(entry.file_name());
        let node = if metadata.is_dir() {
            Node::Dir(read_tree(&path)?)
        } else {
            let bytes = fs::read(&path).map_err(TmpDirError::io(&path))?;
            Node::File(Contents::from_bytes(bytes))
        };
        tree.push(name, node);
    }
    Ok(tree.sorted())
}

static CWD_LOCK: Mutex<()> = Mutex::new(());

thread_local! {
    static CWD_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Restores the previous working directory when dropped.
///
/// The working directory is process-wide, so guards on different threads
/// take turns through a global lock. Nested guards on one thread share the
/// lock taken by the outermost one.
#[must_use = "the working directory is restored as soon as the guard drops"]
#[derive(Debug)]
pub struct CwdGuard {
    previous: PathBuf,
    _lock: Option<MutexGuard<'static, ()>>,
}

impl CwdGuard {
    fn enter(target: &Path) -> Result<Self> {
        let lock = if CWD_DEPTH.with(Cell::get) == 0 {
            Some(CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner))
        } else {
            None
        };
        let previous = std::env::current_dir().map_err(TmpDirError::io(Path::new(".")))?;
        std::env::set_current_dir(target).map_err(TmpDirError::io(target))?;
        CWD_DEPTH.with(|depth| depth.set(depth.get() + 1));
        debug!(from = %previous.display(), to = %target.display(), "cwd_changed");
        Ok(Self {
            previous,
            _lock: lock,
        })
    }

    /// Directory that is restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        if let Err(err) = std::env::set_current_dir(&self.previous) {
            warn!(path = %self.previous.display(), error = %err, "cwd_restore_failed");
        }
        CWD_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
        debug!(to = %self.previous.display(), "cwd_restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree;

    #[test]
    fn gen_returns_names_in_insertion_order() {
        let dir = TmpDir::new().unwrap();
        let names = dir
            .gen(tree! { "b.txt" => "b", "a.txt" => "a", "sub" => {} })
            .unwrap();
        assert_eq!(
            names,
            [Name::from("b.txt"), Name::from("a.txt"), Name::from("sub")]
        );
        assert!(dir.join("sub").is_dir());
        assert_eq!(fs::read_to_string(dir.join("a.txt")).unwrap(), "a");
    }

    #[test]
    fn nested_names_create_parents() {
        let dir = TmpDir::new().unwrap();
        dir.gen_file("deep/er/file.txt", "x").unwrap();
        assert_eq!(fs::read_to_string(dir.join("deep/er/file.txt")).unwrap(), "x");
    }

    #[test]
    fn escaping_names_are_rejected_before_writing() {
        let dir = TmpDir::new().unwrap();
        let err = dir.gen_file("../outside.txt", "x").unwrap_err();
        assert!(matches!(err, TmpDirError::InvalidName(_)));
    }

    #[test]
    fn read_tree_round_trips_generated_fixtures() {
        let dir = TmpDir::new().unwrap();
        let fixture = tree! {
            "z.bin" => b"\xff\xfe",
            "a.txt" => "alpha",
            "nested" => { "inner.txt" => "beta", "empty" => {} },
        };
        dir.gen(fixture.clone()).unwrap();
        assert_eq!(dir.read_tree().unwrap(), fixture.sorted());
        assert_eq!(
            dir.read_tree_at("nested").unwrap(),
            tree! { "empty" => {}, "inner.txt" => "beta" }
        );
    }

    #[test]
    fn wrapping_does_not_take_ownership() {
        let owner = TmpDir::new().unwrap();
        let wrapped = TmpDir::at(owner.path());
        assert!(owner.is_owned());
        assert!(!wrapped.is_owned());
        drop(wrapped);
        assert!(owner.exists());
    }

    #[test]
    fn owned_directory_is_removed_on_drop() {
        let dir = TmpDir::new().unwrap();
        let path = dir.path().to_path_buf();
        drop(dir);
        assert!(!path.exists());
    }
}

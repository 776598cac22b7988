//! Errors produced while creating, populating or reading temp directories.
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TmpDirError {
    /// A filesystem call failed on `path`.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A non-numbered directory was requested but the name is taken.
    #[error("{0:?} already exists")]
    AlreadyExists(PathBuf),

    /// Entry names must be relative and stay below the base directory.
    #[error("invalid entry name: {0:?}")]
    InvalidName(String),
}

impl TmpDirError {
    /// Adapter for `map_err` that tags an `io::Error` with the path involved.
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> TmpDirError + '_ {
        move |source| TmpDirError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            TmpDirError::Io { path, .. } | TmpDirError::AlreadyExists(path) => Some(path),
            TmpDirError::InvalidName(_) => None,
        }
    }
}

pub type Result<T, E = TmpDirError> = std::result::Result<T, E>;

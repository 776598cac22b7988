//! Ready-made temp directory that is also the working directory.
use std::ops::Deref;

use tmpdir::{CwdGuard, TmpDir, TmpDirError};

/// A fresh [`TmpDir`] that is the working directory while this value lives.
///
/// The previous working directory is restored before the directory is
/// removed.
#[derive(Debug)]
pub struct TmpDirFixture {
    guard: CwdGuard,
    dir: TmpDir,
}

impl TmpDirFixture {
    pub fn dir(&self) -> &TmpDir {
        &self.dir
    }

    pub fn guard(&self) -> &CwdGuard {
        &self.guard
    }
}

impl Deref for TmpDirFixture {
    type Target = TmpDir;

    fn deref(&self) -> &TmpDir {
        &self.dir
    }
}

/// Creates a temp directory with the default prefix and enters it.
pub fn tmp_dir() -> Result<TmpDirFixture, TmpDirError> {
    enter(TmpDir::new()?)
}

pub(crate) fn enter(dir: TmpDir) -> Result<TmpDirFixture, TmpDirError> {
    let guard = dir.chdir()?;
    Ok(TmpDirFixture { guard, dir })
}

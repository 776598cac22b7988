//! Temporary directories for filesystem fixtures.
//!
//! Describe the files a test needs as a [`Tree`] (or with the [`tree!`]
//! macro), write it with [`TmpDir::gen`], and read the result back with
//! [`TmpDir::read_tree`] to assert on what the code under test produced.
//! [`TmpDir::chdir`] switches the working directory for the lifetime of a
//! guard, and [`TempDirFactory`] hands out numbered sub-directories of one
//! session-wide base.
//!
//! ```
//! use tmpdir::{tree, TmpDir};
//!
//! let dir = TmpDir::new().unwrap();
//! dir.gen(tree! { "input.csv" => "a,b\n1,2\n" }).unwrap();
//!
//! let seen = dir
//!     .with_cwd(|| std::fs::read_to_string("input.csv").unwrap())
//!     .unwrap();
//! assert_eq!(seen, "a,b\n1,2\n");
//! ```
//!
mod dir;
mod error;
mod factory;
mod tree;

pub use crate::dir::{CwdGuard, TmpDir};
pub use crate::error::{Result, TmpDirError};
pub use crate::factory::TempDirFactory;
pub use crate::tree::{Contents, Name, Node, Tree};

//! Test-authoring helpers in one crate.
//!
//! - [`matchers`]: placeholder values for partial assertions on nested data
//!   (`dict!`, `m!`, `unordered!`, `approx`, ...).
//! - [`tmpdir`]: temp directories with declarative file trees.
//! - [`waiters`]: poll a condition until it holds or a timeout passes.
//!
//! Defaults for all three can be loaded from YAML, see [`TestUtilsConfig`].
//!
//! ```
//! use std::time::Duration;
//! use testutils::{assert_match, dict, tree, unordered, wait_for, Matcher};
//! use serde_json::json;
//!
//! let dir = testutils::tmp_dir().unwrap();
//! dir.gen(tree! { "out" => { "b.txt" => "2", "a.txt" => "1" } }).unwrap();
//! wait_for(|| dir.join("out/a.txt").exists(), Duration::from_secs(1), Duration::from_millis(10))
//!     .unwrap();
//!
//! assert_match!(
//!     json!({"files": ["b.txt", "a.txt"], "took": 12}),
//!     dict! { files = unordered!["a.txt", "b.txt"], took = Matcher::ANY }
//! );
//! ```

pub mod config;
mod fixture;

pub use matchers;
pub use tmpdir;
pub use waiters;

pub use matchers::{
    any_of, approx, assert_match, attrs, dict, list, m, unordered, Any, AnyOf, Approx,
    ApproxConfig, ApproxOptions, Attrs, Dict, Expected, InstanceOf, Kind, MatchError, Matcher,
    Matches, Mismatch, Object, Regex, RegexFlags, Tolerance, Unordered, Value, M,
};
pub use tmpdir::{tree, Contents, CwdGuard, Name, Node, TempDirFactory, TmpDir, TmpDirError, Tree};
pub use waiters::{wait_for, wait_until, TimedOutError, WaitConfig, WaitConfigError, Waiter};

#[cfg(feature = "tokio")]
pub use waiters::wait_until_async;

pub use crate::config::{ConfigLoadError, TestUtilsConfig};
pub use crate::fixture::{tmp_dir, TmpDirFixture};

impl TestUtilsConfig {
    /// Like [`tmp_dir`], using the configured prefix.
    pub fn tmp_dir_fixture(&self) -> Result<TmpDirFixture, TmpDirError> {
        fixture::enter(self.tmp_dir()?)
    }
}

//! Declarative description of a directory tree.
//!
//! A [`Tree`] is what [`TmpDir::gen`](crate::TmpDir::gen) writes and what
//! [`TmpDir::read_tree`](crate::TmpDir::read_tree) returns, so fixtures and
//! assertions share one shape.
use std::ffi::OsString;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, TmpDirError};

/// Name of a tree entry. May contain `/` to address nested paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Name {
    Text(String),
    Bytes(Vec<u8>),
}

impl Name {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Name::Text(text) => text.as_bytes(),
            Name::Bytes(bytes) => bytes,
        }
    }

    /// Decodes the name the way the OS would and checks that it stays
    /// relative to the directory it is written into.
    pub(crate) fn to_relative_path(&self) -> Result<PathBuf> {
        let path = PathBuf::from(self.to_os_string());
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if self.as_bytes().is_empty() || escapes {
            return Err(TmpDirError::InvalidName(self.to_string()));
        }
        Ok(path)
    }

    #[cfg(unix)]
    fn to_os_string(&self) -> OsString {
        use std::os::unix::ffi::OsStringExt;
        OsString::from_vec(self.as_bytes().to_vec())
    }

    #[cfg(not(unix))]
    fn to_os_string(&self) -> OsString {
        OsString::from(String::from_utf8_lossy(self.as_bytes()).into_owned())
    }

    #[cfg(unix)]
    pub(crate) fn from_os_string(name: OsString) -> Name {
        use std::os::unix::ffi::OsStringExt;
        match String::from_utf8(name.into_vec()) {
            Ok(text) => Name::Text(text),
            Err(err) => Name::Bytes(err.into_bytes()),
        }
    }

    #[cfg(not(unix))]
    pub(crate) fn from_os_string(name: OsString) -> Name {
        match name.into_string() {
            Ok(text) => Name::Text(text),
            Err(name) => Name::Text(name.to_string_lossy().into_owned()),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Text(text) => f.write_str(text),
            Name::Bytes(bytes) => write!(f, "{}", bytes.escape_ascii()),
        }
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::Text(value.to_string())
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::Text(value)
    }
}

impl From<&[u8]> for Name {
    fn from(value: &[u8]) -> Self {
        Name::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Name {
    fn from(value: &[u8; N]) -> Self {
        Name::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Name {
    fn from(value: Vec<u8>) -> Self {
        Name::Bytes(value)
    }
}

impl From<&Path> for Name {
    fn from(value: &Path) -> Self {
        Name::from_os_string(value.as_os_str().to_os_string())
    }
}

/// File contents. Text is written as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    Text(String),
    Bytes(Vec<u8>),
}

impl Contents {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Contents::Text(text) => text.as_bytes(),
            Contents::Bytes(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Contents::Text(text) => Some(text),
            Contents::Bytes(_) => None,
        }
    }

    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Contents {
        match String::from_utf8(bytes) {
            Ok(text) => Contents::Text(text),
            Err(err) => Contents::Bytes(err.into_bytes()),
        }
    }
}

impl From<&str> for Contents {
    fn from(value: &str) -> Self {
        Contents::Text(value.to_string())
    }
}

impl From<String> for Contents {
    fn from(value: String) -> Self {
        Contents::Text(value)
    }
}

impl From<&String> for Contents {
    fn from(value: &String) -> Self {
        Contents::Text(value.clone())
    }
}

impl From<&[u8]> for Contents {
    fn from(value: &[u8]) -> Self {
        Contents::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Contents {
    fn from(value: &[u8; N]) -> Self {
        Contents::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Contents {
    fn from(value: Vec<u8>) -> Self {
        Contents::Bytes(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(Contents),
    /// A directory; an empty tree creates an empty directory.
    Dir(Tree),
}

impl From<Contents> for Node {
    fn from(value: Contents) -> Self {
        Node::File(value)
    }
}

impl From<Tree> for Node {
    fn from(value: Tree) -> Self {
        Node::Dir(value)
    }
}

/// Insertion-ordered directory listing.
///
/// ```rust
/// use tmpdir::{tree, Tree};
///
/// let built = Tree::new()
///     .file("README.md", "# demo")
///     .dir("src", Tree::new().file("main.rs", "fn main() {}"))
///     .empty_dir("target");
/// let declared = tree! {
///     "README.md" => "# demo",
///     "src" => { "main.rs" => "fn main() {}" },
///     "target" => {},
/// };
/// assert_eq!(built, declared);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<(Name, Node)>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: impl Into<Name>, contents: impl Into<Contents>) -> Self {
        self.push(name, Node::File(contents.into()));
        self
    }

    pub fn dir(mut self, name: impl Into<Name>, tree: Tree) -> Self {
        self.push(name, Node::Dir(tree));
        self
    }

    pub fn empty_dir(self, name: impl Into<Name>) -> Self {
        self.dir(name, Tree::new())
    }

    pub fn push(&mut self, name: impl Into<Name>, node: impl Into<Node>) {
        self.entries.push((name.into(), node.into()));
    }

    pub fn entries(&self) -> &[(Name, Node)] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.entries.iter().map(|(name, _)| name)
    }

    /// Looks up a direct child by its text name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_bytes() == name.as_bytes())
            .map(|(_, node)| node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorts entries by name, recursively.
    pub fn sorted(mut self) -> Self {
        self.sort();
        self
    }

    pub(crate) fn sort(&mut self) {
        self.entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
        for (_, node) in &mut self.entries {
            if let Node::Dir(tree) = node {
                tree.sort();
            }
        }
    }
}

impl<N: Into<Name>> FromIterator<(N, Node)> for Tree {
    fn from_iter<I: IntoIterator<Item = (N, Node)>>(iter: I) -> Self {
        let mut tree = Tree::new();
        for (name, node) in iter {
            tree.push(name, node);
        }
        tree
    }
}

/// Builds a [`Tree`].
///
/// Values are file contents (`"text"`, `b"bytes"`, or any parenthesized
/// expression convertible into [`Contents`]) or a braced sub-tree. `{}`
/// denotes an empty directory.
#[macro_export]
macro_rules! tree {
    ($($name:expr => $node:tt),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut tree = $crate::Tree::new();
        $( tree.push($name, $crate::__tree_node!($node)); )*
        tree
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __tree_node {
    ({ $($inner:tt)* }) => {
        $crate::Node::Dir($crate::tree!($($inner)*))
    };
    ($contents:expr) => {
        $crate::Node::File($crate::Contents::from($contents))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_must_stay_relative() {
        assert!(Name::from("a/b.txt").to_relative_path().is_ok());
        assert!(Name::from("./a").to_relative_path().is_ok());
        for bad in ["", "../escape", "/etc/passwd", "a/../../b"] {
            assert!(
                matches!(Name::from(bad).to_relative_path(), Err(TmpDirError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn contents_decode_as_text_when_possible() {
        assert_eq!(Contents::from_bytes(b"hi".to_vec()), Contents::from("hi"));
        assert_eq!(
            Contents::from_bytes(vec![0xff, 0x00]),
            Contents::Bytes(vec![0xff, 0x00])
        );
    }

    #[test]
    fn sorting_is_recursive() {
        let tree = tree! {
            "b" => { "z" => "", "y" => "" },
            "a" => "",
        }
        .sorted();
        let names: Vec<String> = tree.names().map(ToString::to_string).collect();
        assert_eq!(names, ["a", "b"]);
        let Some(Node::Dir(sub)) = tree.get("b") else {
            panic!("b should be a directory");
        };
        let names: Vec<String> = sub.names().map(ToString::to_string).collect();
        assert_eq!(names, ["y", "z"]);
    }

    #[test]
    fn macro_accepts_expressions_and_bytes() {
        let greeting = String::from("hello");
        let tree = tree! {
            "text" => (greeting.clone()),
            "raw" => b"\x00\x01",
            b"bin-name" => "x",
        };
        assert_eq!(tree.get("text"), Some(&Node::File(Contents::Text(greeting))));
        assert_eq!(
            tree.get("raw"),
            Some(&Node::File(Contents::Bytes(vec![0, 1])))
        );
        assert_eq!(tree.get("bin-name"), Some(&Node::File(Contents::from("x"))));
    }

    #[test]
    fn empty_macro_is_an_empty_tree() {
        assert!(tree! {}.is_empty());
    }
}

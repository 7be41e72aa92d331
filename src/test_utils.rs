use std::ffi::OsStr;
use std::fs;
use std::fs::create_dir_all;
use std::path::Path as StdPath;

use async_walkdir::WalkDir;
use futures_lite::StreamExt;
use similar::ChangeTag;
use similar::TextDiff;
use tempdir::TempDir;

use crate::Error;
use crate::RelPath;

/// Kind of node created in a [`TestRoot`].
#[derive(Debug, Clone, Copy)]
pub enum Node {
    /// A regular file with the given contents.
    File(&'static str),
    /// An empty directory.
    Dir,
    /// A symlink with the given raw target.
    Symlink(&'static str),
}

/// The reference tree: a small root filesystem with one absolute symlink.
pub static TEMP_FILES: &[(&str, Node)] = &[
    ("dev/random", Node::File("")),
    ("etc/hostname", Node::File("localhost\n")),
    ("etc/certs/ca.crt", Node::File("-----BEGIN CERTIFICATE-----\n")),
    ("lib/dynalib.so", Node::File("\x7fELF")),
    ("usr/bin/cp", Node::File("#!/bin/sh\n")),
    ("usr/bin/mv", Node::Symlink("/usr/bin/cp")),
];

/// Utility structure for managing a temporary test directory and its files.
#[derive(Debug)]
pub struct TestRoot {
    /// Root of the temporary test directory.
    pub root: TempDir,
}

impl TestRoot {
    /// Creates a temporary directory populated with [`TEMP_FILES`].
    pub fn new() -> Result<Self, Error> {
        Self::with_nodes(TEMP_FILES)
    }

    /// Creates a temporary directory populated with `nodes`.
    pub fn with_nodes(nodes: &[(&str, Node)]) -> Result<Self, Error> {
        let root = TempDir::new("fswalker").map_err(|e| Error::InvalidArgument(format!(
            "failed to create temporary directory: {e}"
        )))?;
        let ret = Self { root };
        for (relative_path, node) in nodes {
            ret.create(relative_path, *node)
                .map_err(|e| Error::InvalidArgument(format!("{relative_path}: {e}")))?;
        }
        Ok(ret)
    }

    /// Path of the temporary root.
    pub fn path(&self) -> &StdPath {
        self.root.path()
    }

    /// Creates `node` at `relative_path`, creating parents as needed.
    pub fn create(&self, relative_path: &str, node: Node) -> Result<(), std::io::Error> {
        let full_path = self.root.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            create_dir_all(parent)?;
        }
        match node {
            Node::File(contents) => fs::write(&full_path, contents),
            Node::Dir => create_dir_all(&full_path),
            Node::Symlink(target) => symlink(target, &full_path),
        }
    }

    /// Lists every path below the root, sorted in walk order.
    ///
    /// Built on a different directory walker so that it can be used to
    /// cross-check the crate's own traversal.
    pub async fn cross_check_paths(&self) -> Result<Vec<String>, Error> {
        let base = self.root.path();
        let mut paths = Vec::new();
        let mut entries = WalkDir::new(base);
        while let Some(entry) = entries.next().await {
            let entry = entry.map_err(|e| Error::ListDir {
                what: base.display().to_string(),
                how: e.to_string(),
            })?;
            let path = entry.path();
            let relative = path.strip_prefix(base).map_err(|e| Error::InvalidArgument(
                format!("{}: {e}", path.display()),
            ))?;
            let components: Vec<&OsStr> = relative.components().map(|c| c.as_os_str()).collect();
            paths.push(RelPath::try_from(components.as_slice())?);
        }
        paths.sort();
        Ok(paths.iter().map(ToString::to_string).collect())
    }

    /// Returns `None` if both path lists are identical, or a line diff of
    /// them otherwise.
    pub fn diff<E: AsRef<str>, A: AsRef<str>>(expected: &[E], actual: &[A]) -> Option<String> {
        let join = |items: Vec<&str>| {
            let mut s = items.join("\n");
            s.push('\n');
            s
        };
        let expected = join(expected.iter().map(AsRef::as_ref).collect());
        let actual = join(actual.iter().map(AsRef::as_ref).collect());

        let diff = TextDiff::from_lines(&expected, &actual);
        let mut diffs = String::new();
        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => continue,
            };
            diffs.push_str(&format!("{sign}{change}"));
        }
        if diffs.is_empty() { None } else { Some(diffs) }
    }
}

#[cfg(unix)]
fn symlink(target: &str, link: &StdPath) -> Result<(), std::io::Error> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &str, link: &StdPath) -> Result<(), std::io::Error> {
    std::os::windows::fs::symlink_file(target, link)
}

//! Temporary directories with a few helpers for writing watched files.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temp directory that is removed on drop.
pub struct FileTree {
    dir: TempDir,
}

impl FileTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("creating temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `rel` inside the tree (not necessarily existing).
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Same as [`FileTree::path`], as a `String` for watch lists.
    pub fn path_str(&self, rel: &str) -> String {
        self.path(rel).to_string_lossy().into_owned()
    }

    /// Write (or overwrite) a file, creating parent directories.
    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("creating parent dirs");
        }
        fs::write(&path, contents).expect("writing fixture file");
        path
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).expect("creating fixture dir");
        path
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.path(rel)).expect("removing fixture file");
    }

    /// Canonical form of `rel`, as the watcher keys it.
    pub fn canonical(&self, rel: &str) -> PathBuf {
        fs::canonicalize(self.path(rel)).expect("canonicalizing fixture path")
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

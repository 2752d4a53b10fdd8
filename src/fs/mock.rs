// src/fs/mock.rs

//! In-memory [`FileSystem`] for tests.
//!
//! Paths are normalized lexically against a fixed working directory
//! (`/work` by default), so `a.txt`, `./a.txt` and `/work/a.txt` all name
//! the same entry. Symlinks are not modelled.

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
    /// Exists, but every open fails (e.g. permission denied).
    Unreadable,
}

#[derive(Debug, Clone)]
pub struct MockFileSystem {
    cwd: PathBuf,
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_cwd("/work")
    }

    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        let cwd: PathBuf = cwd.into();
        let cwd = normalize(Path::new("/"), &cwd);
        let fs = Self {
            cwd,
            entries: Arc::new(Mutex::new(HashMap::new())),
        };
        fs.add_dir(fs.cwd.clone());
        fs
    }

    /// Working directory that relative paths are resolved against.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Absolute form of `path` as this filesystem would canonicalize it.
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize(&self.cwd, path.as_ref())
    }

    /// Create or overwrite a file. Parent directories are created implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert(path.as_ref(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir);
    }

    pub fn add_unreadable(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Unreadable);
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let abs = self.absolute(path);
        self.lock().remove(&abs);
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let abs = self.absolute(path);
        let mut entries = self.lock();
        for ancestor in abs.ancestors().skip(1) {
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
        entries.insert(abs, entry);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MockFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let abs = self.absolute(path);
        match self.lock().get(&abs) {
            Some(MockEntry::File(content)) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", abs)),
            Some(MockEntry::Unreadable) => Err(anyhow!("Permission denied: {:?}", abs)),
            None => Err(anyhow!("File not found: {:?}", abs)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let abs = self.absolute(path);
        matches!(self.lock().get(&abs), Some(MockEntry::Dir))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let abs = self.absolute(path);
        if self.lock().contains_key(&abs) {
            Ok(abs)
        } else {
            Err(anyhow!("File not found: {:?}", abs))
        }
    }
}

/// Lexically resolve `path` against `base`, folding `.` and `..`.
fn normalize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::from("/");
    for component in joined.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_and_absolute_spellings_share_an_entry() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.txt", b"a");

        assert_eq!(
            fs.canonicalize(Path::new("./src/../src/a.txt")).unwrap(),
            PathBuf::from("/work/src/a.txt")
        );
        assert!(fs.is_dir(Path::new("/work/src")));
        assert!(fs.open_read(Path::new("/work/src/a.txt")).is_ok());
    }

    #[test]
    fn unreadable_entries_exist_but_fail_to_open() {
        let fs = MockFileSystem::new();
        fs.add_unreadable("secret");

        assert!(fs.canonicalize(Path::new("secret")).is_ok());
        assert!(fs.open_read(Path::new("secret")).is_err());
    }

    #[test]
    fn relative_paths_resolve_against_a_custom_cwd() {
        let fs = MockFileSystem::with_cwd("/srv/../repo/");
        assert_eq!(fs.cwd(), Path::new("/repo"));
        assert!(fs.is_dir(fs.cwd()));

        fs.add_file("notes.md", b"n");
        assert_eq!(
            fs.canonicalize(Path::new("notes.md")).unwrap(),
            fs.cwd().join("notes.md")
        );
    }
}

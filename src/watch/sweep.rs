// src/watch/sweep.rs

//! One poll cycle: resolve → hash → compare → publish.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::debug;

use crate::fs::FileSystem;
use crate::watch::hash::{hash_files, FileHashes};
use crate::watch::resolve::resolve_paths;

/// Snapshot pair emitted once per detected change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchResult {
    /// Hashes as they were before the sweep that detected the change.
    pub old: Arc<FileHashes>,
    /// Hashes computed by that sweep.
    pub new: Arc<FileHashes>,
}

impl WatchResult {
    /// Paths whose digest differs between `old` and `new`, or that appear on
    /// only one side. Sorted.
    pub fn changed_paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = self
            .new
            .iter()
            .filter(|(path, digest)| self.old.get(*path) != Some(*digest))
            .map(|(path, _)| path.as_path())
            .chain(
                self.old
                    .keys()
                    .filter(|path| !self.new.contains_key(*path))
                    .map(|path| path.as_path()),
            )
            .collect();
        paths.sort();
        paths
    }
}

/// Decide whether `current` counts as a change relative to `previous`.
///
/// A cardinality mismatch (file added or removed) is a change on its own;
/// otherwise any path that is new or whose digest differs is a change.
/// Two empty maps are unchanged.
pub fn detect_change(previous: &FileHashes, current: &FileHashes) -> bool {
    if previous.len() != current.len() {
        return true;
    }
    current
        .iter()
        .any(|(path, digest)| previous.get(path) != Some(digest))
}

/// Owns a session's current hash map and runs sweeps against it.
///
/// Sweeps are serialized; the current map is only ever replaced wholesale
/// once a sweep has hashed every file.
#[derive(Debug, Clone)]
pub struct Sweeper {
    fs: Arc<dyn FileSystem>,
    workers: usize,
    current: Arc<Mutex<Arc<FileHashes>>>,
    sweeping: Arc<Mutex<()>>,
}

impl Sweeper {
    pub fn new(fs: Arc<dyn FileSystem>, workers: usize) -> Self {
        Self {
            fs,
            workers: workers.max(1),
            current: Arc::new(Mutex::new(Arc::new(FileHashes::new()))),
            sweeping: Arc::new(Mutex::new(())),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The most recently published hash map.
    pub fn current(&self) -> Arc<FileHashes> {
        Arc::clone(&self.lock_current())
    }

    /// Run one sweep over `files`.
    ///
    /// Returns `Some` with the old/new pair if the set changed since the
    /// previous sweep. The new map becomes current either way.
    pub fn sweep<P: AsRef<Path>>(&self, files: &[P]) -> Option<WatchResult> {
        let _sweeping = self.sweeping.lock().unwrap_or_else(PoisonError::into_inner);
        let started = Instant::now();

        let canonical = resolve_paths(&*self.fs, files);
        let previous = self.current();
        let hashes = hash_files(&*self.fs, &canonical, self.workers);
        let changed = detect_change(&previous, &hashes);

        let hashes = Arc::new(hashes);
        *self.lock_current() = Arc::clone(&hashes);

        debug!(
            requested = files.len(),
            watched = canonical.len(),
            changed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sweep finished"
        );

        changed.then(|| WatchResult {
            old: previous,
            new: hashes,
        })
    }

    fn lock_current(&self) -> MutexGuard<'_, Arc<FileHashes>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// src/watch/hash.rs

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::fs::FileSystem;

/// Canonical path → digest of that file's full contents.
pub type FileHashes = BTreeMap<PathBuf, Digest>;

/// Content digest of one watched file.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Digest {
    /// blake3 hash of the whole file.
    Content(blake3::Hash),
    /// The file is present but could not be opened or read.
    ///
    /// Compares equal only to itself, so a file that becomes readable
    /// registers as changed on the next sweep.
    Unreadable,
}

impl Digest {
    /// Raw digest bytes; empty for [`Digest::Unreadable`].
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Digest::Content(hash) => hash.as_bytes(),
            Digest::Unreadable => &[],
        }
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self, Digest::Unreadable)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Digest::Content(hash) => write!(f, "{}", hash.to_hex()),
            Digest::Unreadable => f.write_str("<unreadable>"),
        }
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

/// Hash a single file, streaming its full contents.
///
/// Open or read failures yield [`Digest::Unreadable`] instead of an error.
pub fn hash_file(fs: &dyn FileSystem, path: &Path) -> Digest {
    match try_hash_file(fs, path) {
        Ok(hash) => Digest::Content(hash),
        Err(err) => {
            debug!(path = ?path, error = %err, "file unreadable; using sentinel digest");
            Digest::Unreadable
        }
    }
}

fn try_hash_file(fs: &dyn FileSystem, path: &Path) -> Result<blake3::Hash> {
    let mut reader = fs.open_read(path)?;
    let mut hasher = Hasher::new();
    io::copy(&mut reader, &mut hasher)
        .with_context(|| format!("reading file for hashing: {:?}", path))?;
    Ok(hasher.finalize())
}

/// Number of hashing workers to use when none is configured.
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Hash every file in `files` using up to `workers` threads.
///
/// Work is striped statically: worker `i` takes files `i`, `i + n`,
/// `i + 2n`, ... Results are collected under a mutex and only returned once
/// every worker has finished. The result does not depend on `workers`.
pub fn hash_files(fs: &dyn FileSystem, files: &[PathBuf], workers: usize) -> FileHashes {
    let workers = workers.max(1).min(files.len());
    if workers == 0 {
        return FileHashes::new();
    }

    let hashes = Mutex::new(FileHashes::new());

    thread::scope(|scope| {
        for start in 0..workers {
            let hashes = &hashes;
            scope.spawn(move || {
                for path in files.iter().skip(start).step_by(workers) {
                    let digest = hash_file(fs, path);
                    hashes
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(path.clone(), digest);
                }
            });
        }
    });

    hashes.into_inner().unwrap_or_else(PoisonError::into_inner)
}

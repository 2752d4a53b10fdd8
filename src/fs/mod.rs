// src/fs/mod.rs

//! Filesystem seam used by path resolution and hashing.
//!
//! The watcher only ever needs three primitives: canonicalize a path, ask
//! whether it is a directory, and stream its bytes. Keeping them behind a
//! trait lets tests drive the resolver and hasher from memory.

use std::fmt::Debug;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Open a file for streaming reads.
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>>;

    fn is_dir(&self, path: &Path) -> bool;

    /// Resolve `path` to an absolute, canonical form.
    ///
    /// Fails if the path does not exist or cannot be inspected.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path).with_context(|| format!("opening file {:?}", path))?;
        Ok(Box::new(file))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("canonicalizing {:?}", path))
    }
}

// src/watch/mod.rs

//! Poll-based change detection.
//!
//! This module is responsible for:
//! - Resolving a requested file list into canonical, existing files.
//! - Hashing those files in parallel (blake3).
//! - Comparing each sweep against the previous one.
//! - Running the timer-driven session loop that ties it together.
//!
//! There is no OS notification integration here; every change is found by
//! re-hashing on a fixed interval.

pub mod hash;
pub mod resolve;
pub mod session;
pub mod sweep;

pub use hash::{default_workers, hash_file, hash_files, Digest, FileHashes};
pub use resolve::resolve_paths;
pub use session::{watch, watch_with, Session, SessionHandle, WatchOptions};
pub use sweep::{detect_change, Sweeper, WatchResult};

// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::watch::{default_workers, WatchOptions};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// poll_interval_ms = 5000
/// workers = 4
/// notify_capacity = 1
/// files = ["./f1", "./f2"]
/// ```
///
/// Every key is optional. This is the unvalidated form; convert it with
/// `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchSection {
    /// Delay between sweeps, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Hashing workers per sweep. Defaults to the available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Buffered change notifications before the loop waits on the consumer.
    #[serde(default = "default_notify_capacity")]
    pub notify_capacity: usize,

    /// Files to watch.
    #[serde(default)]
    pub files: Vec<String>,
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_notify_capacity() -> usize {
    1
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            workers: None,
            notify_capacity: default_notify_capacity(),
            files: Vec::new(),
        }
    }
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection) -> Self {
        Self { watch }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watch.poll_interval_ms)
    }

    /// Session options derived from `[watch]`.
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            poll_interval: self.poll_interval(),
            workers: self.watch.workers.unwrap_or_else(default_workers),
            notify_capacity: self.watch.notify_capacity,
        }
    }
}

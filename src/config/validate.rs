// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, WatchSection};
use crate::errors::{PollwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PollwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_watch_section(&raw.watch)?;
        Ok(ConfigFile::new_unchecked(raw.watch))
    }
}

fn validate_watch_section(watch: &WatchSection) -> Result<()> {
    if watch.poll_interval_ms == 0 {
        return Err(PollwatchError::ConfigError(
            "[watch].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if watch.notify_capacity == 0 {
        return Err(PollwatchError::ConfigError(
            "[watch].notify_capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    if watch.workers == Some(0) {
        return Err(PollwatchError::ConfigError(
            "[watch].workers must be >= 1 when set (got 0)".to_string(),
        ));
    }

    Ok(())
}

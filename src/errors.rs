// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Only configuration loading and the binary produce errors; a running
//! watch session never surfaces one (per-file failures become
//! [`Digest::Unreadable`](crate::watch::Digest::Unreadable)).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PollwatchError>;

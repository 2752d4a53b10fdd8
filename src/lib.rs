// src/lib.rs

//! Poll a fixed set of files and report when their contents change.
//!
//! The library entry point is [`watch`]; the `pollwatch` binary is a thin
//! shell around it (see [`run`]).

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod watch;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, ConfigFile, RawConfigFile};
use crate::fs::RealFileSystem;
use crate::watch::{resolve_paths, FileHashes, Sweeper, WatchResult};

pub use crate::watch::{watch, watch_with, Digest, Session, SessionHandle, WatchOptions};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the watch session (or a single sweep in `--once` mode)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;

    let mut options = cfg.watch_options();
    if let Some(ms) = args.interval_ms {
        options.poll_interval = Duration::from_millis(ms);
    }

    let files = if args.files.is_empty() {
        cfg.watch.files.clone()
    } else {
        args.files.clone()
    };

    if args.dry_run {
        print_dry_run(&files);
        return Ok(());
    }

    if args.once {
        let sweeper = Sweeper::new(Arc::new(RealFileSystem), options.workers);
        let hashes = tokio::task::spawn_blocking(move || {
            sweeper.sweep(&files);
            sweeper.current()
        })
        .await
        .context("hashing watched files")?;
        print_hashes(&hashes);
        return Ok(());
    }

    let mut session = watch_with(options, files, Arc::new(RealFileSystem));

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res.context("listening for Ctrl+C")?;
                info!("Ctrl+C received; stopping");
                break;
            }
            next = session.recv() => match next {
                Some(result) => print_result(&result),
                None => break,
            },
        }
    }

    session.stop().await;
    Ok(())
}

/// Explicit `--config` must exist; the default `Pollwatch.toml` is optional.
fn load_config(explicit: Option<&str>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path).with_context(|| format!("loading config {path}"));
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        debug!(path = ?default_path, "using default config file");
        return load_and_validate(&default_path)
            .with_context(|| format!("loading config {}", default_path.display()));
    }

    Ok(ConfigFile::try_from(RawConfigFile::default())?)
}

fn print_dry_run(files: &[String]) {
    let resolved = resolve_paths(&RealFileSystem, files);

    println!("pollwatch dry-run");
    println!("  requested: {}", files.len());
    println!("  watched ({}):", resolved.len());
    for path in resolved {
        println!("    {}", path.display());
    }
}

fn print_hashes(hashes: &FileHashes) {
    for (path, digest) in hashes {
        println!("{digest}  {}", path.display());
    }
}

fn print_result(result: &WatchResult) {
    println!("changed ({} files watched):", result.new.len());
    for path in result.changed_paths() {
        println!(
            "  {}  {} -> {}",
            path.display(),
            digest_or_dash(&result.old, path),
            digest_or_dash(&result.new, path)
        );
    }
}

fn digest_or_dash(hashes: &FileHashes, path: &Path) -> String {
    hashes
        .get(path)
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

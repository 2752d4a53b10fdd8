// src/logging.rs

//! Logging setup for `pollwatch` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `POLLWATCH_LOG`: a bare level ("debug", "warning", ...) or a full
//!    `EnvFilter` directive string ("pollwatch::watch=trace,info")
//! 3. `RUST_LOG`, in `EnvFilter` syntax
//! 4. default to `info`
//!
//! Unparseable values fall through to the next source.
//!
//! Logs are sent to STDERR so that stdout carries only change reports.

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let pollwatch_log = std::env::var("POLLWATCH_LOG").ok();
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(cli_level, pollwatch_log.as_deref(), rust_log.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

/// Pick the filter from the CLI flag and the two environment variables.
fn build_filter(
    cli_level: Option<LogLevel>,
    pollwatch_log: Option<&str>,
    rust_log: Option<&str>,
) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return level_filter(level_from_log_level(lvl));
    }

    if let Some(filter) = pollwatch_log.and_then(|s| {
        parse_level_str(s)
            .map(level_filter)
            .or_else(|| parse_directives(s))
    }) {
        return filter;
    }

    rust_log
        .and_then(parse_directives)
        .unwrap_or_else(|| level_filter(tracing::Level::INFO))
}

fn level_filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
}

fn parse_directives(s: &str) -> Option<EnvFilter> {
    if s.trim().is_empty() {
        return None;
    }
    EnvFilter::try_new(s.trim()).ok()
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

//! Log setup for the CLI
//!
//! `plan` and `teardown` log to a daily file under `[logging] directory` and
//! echo INFO and above to stderr. `RUST_LOG` overrides both levels.

use crate::config::{expand_tilde, LogSection};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "backup-coordinator";

/// Resolved `[logging]` section
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_level: LevelFilter,
    /// Rotated files kept after startup
    pub max_files: usize,
}

impl LoggingConfig {
    /// Unknown level names fall back to `info`
    pub fn from_config(section: &LogSection) -> Self {
        Self {
            directory: expand_tilde(&section.directory),
            file_level: section.level.parse().unwrap_or(LevelFilter::INFO),
            max_files: section.max_files as usize,
        }
    }
}

/// Keeps the non-blocking file writer alive; dropping it flushes the file
pub struct LogGuard {
    _file_guard: WorkerGuard,
}

/// Install the file + stderr subscriber and prune old log files
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    fs::create_dir_all(&config.directory)
        .with_context(|| format!("Failed to create log directory: {:?}", config.directory))?;

    let appender = rolling::daily(&config.directory, format!("{}.log", LOG_FILE_PREFIX));
    let (writer, file_guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(env_filter(config.file_level));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter(LevelFilter::INFO));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    let removed = prune_logs(&config.directory, config.max_files)?;
    if removed > 0 {
        tracing::debug!("Removed {} old log file(s)", removed);
    }

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Stderr-only logging for commands that never touch the log directory
pub fn init_console_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(LevelFilter::INFO))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn env_filter(default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy()
}

/// Delete all but the `keep` newest coordinator log files, returning how many went
fn prune_logs(dir: &Path, keep: usize) -> Result<usize> {
    let mut logs: Vec<(SystemTime, PathBuf)> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list log directory: {:?}", dir))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.contains(".log"))
        })
        .map(|entry| {
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, entry.path())
        })
        .collect();

    logs.sort_by(|a, b| b.0.cmp(&a.0));

    let mut removed = 0;
    for (_, path) in logs.into_iter().skip(keep) {
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Failed to remove old log file {:?}: {}", path, e),
        }
    }
    Ok(removed)
}

//! File-backed tracing. The terminal belongs to the TUI, so logs go to
//! `<config_dir>/logs/feed.log`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

const LOG_FILE: &str = "feed.log";

pub fn log_dir(config_dir: &Path) -> PathBuf {
    config_dir.join("logs")
}

pub fn log_path(config_dir: &Path) -> PathBuf {
    log_dir(config_dir).join(LOG_FILE)
}

fn default_directive(verbose: bool) -> Result<Directive> {
    let level = if verbose { "debug" } else { "info" };
    format!("{}={level}", env!("CARGO_CRATE_NAME"))
        .parse()
        .context("Invalid default log directive")
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// The returned guard flushes buffered lines when dropped, so hold it until exit.
pub fn init(config_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    let dir = log_dir(config_dir);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, LOG_FILE));
    let filter = EnvFilter::builder()
        .with_default_directive(default_directive(verbose)?)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install log subscriber")?;

    Ok(guard)
}

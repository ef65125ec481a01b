use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const LOG_FILE_NAME: &str = "safesphere.log";

/// Resolve where logs go: the configured file, or the user cache dir.
pub fn log_path(config: &LoggingConfig) -> Result<PathBuf> {
    if let Some(ref file) = config.file {
        if !file.trim().is_empty() {
            return Ok(PathBuf::from(file));
        }
    }

    let dir = dirs::cache_dir()
        .context("Failed to get cache directory")?
        .join("safesphere");
    Ok(dir.join(LOG_FILE_NAME))
}

/// Install the global subscriber. The terminal belongs to the UI, so output
/// goes to a file. `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &LoggingConfig) -> Result<PathBuf> {
    let path = log_path(config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(path)
}

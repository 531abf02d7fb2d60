//! Diagnostics go to a file: the terminal belongs to the game while it runs.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::Level;

/// Install a global `tracing` subscriber appending to `path`
///
/// Without a log file nothing is installed and the `tracing` macros are no-ops.
pub fn init(path: Option<&Path>, level: Level) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = open_log_file(path)?;
    tracing_subscriber::fmt()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("Failed to install log subscriber")?;

    tracing::info!(path = %path.display(), %level, "logging initialized");
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

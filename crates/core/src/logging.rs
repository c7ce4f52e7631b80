//! Tracing subscriber setup for hosts embedding the core.

use std::{
    fs::{self, OpenOptions},
    path::Path,
};

use anyhow::{Context, Result};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Name of the log file created inside the log directory.
pub const LOG_FILE: &str = "tcg-trade.log";

/// Install a global subscriber writing compact lines to stdout and appending
/// to `<log_dir>/tcg-trade.log`. Filtering follows `RUST_LOG`, defaulting to `info`.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join(LOG_FILE);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_log_file_and_rejects_second_install() -> Result<()> {
        let dir = tempdir()?;
        let log_dir = dir.path().join("logs");
        init_logging(&log_dir)?;
        assert!(log_dir.join(LOG_FILE).exists());
        assert!(init_logging(&log_dir).is_err());
        Ok(())
    }
}

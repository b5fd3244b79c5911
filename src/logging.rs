//! File logging for the TUI.
//!
//! The terminal is owned by ratatui, so tracing output goes to a daily-rotated
//! `incubadmin.log` instead. The filter comes from `RUST_LOG` if set, then the
//! `log_level` setting, then `DEFAULT_LOG_FILTER`. The directory is the
//! `log_dir` setting or `<local data dir>/incubadmin/logs`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::config::Settings;

const DEFAULT_LOG_FILTER: &str = "incubadmin=info,warn";

/// File name prefix; the appender adds the date.
pub const LOG_FILE_PREFIX: &str = "incubadmin.log";

/// Install the file subscriber.
///
/// Returns the directory the log files are written to, so the UI can point
/// users at it.
///
/// # Errors
///
/// Fails if the directory cannot be determined or created, if the filter
/// does not parse, or if a global subscriber is already installed.
pub fn init(settings: &Settings) -> anyhow::Result<PathBuf> {
    let log_dir = resolve_directory(settings.log_dir.as_deref())?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let directive = filter_directive(
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        settings.log_level.as_deref(),
    );
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter '{}'", directive))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %settings.base_url,
        filter = %directive,
        "incubadmin starting up"
    );
    Ok(log_dir)
}

/// Pick the filter directive: environment, then setting, then default.
fn filter_directive(env: Option<String>, configured: Option<&str>) -> String {
    env.filter(|v| !v.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

fn resolve_directory(configured: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = configured {
        return Ok(dir.to_path_buf());
    }
    let base = dirs::data_local_dir().context("Could not determine local data directory")?;
    Ok(base.join("incubadmin").join("logs"))
}

/// Log a clean exit.
pub fn shutdown() {
    tracing::info!("incubadmin shutting down");
}

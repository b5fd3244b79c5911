//! Application settings configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the incubator API (without `/api`).
    pub base_url: String,
    /// The entity table shown at startup.
    pub default_entity: Option<String>,
    /// Event loop tick rate in milliseconds.
    pub tick_rate_ms: u64,
    /// Per-request timeout. Absent means requests never time out.
    pub request_timeout_secs: Option<u64>,
    /// tracing filter directive used when `RUST_LOG` is unset.
    pub log_level: Option<String>,
    /// Log file directory. Defaults to the local data dir.
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    /// The request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_entity: Some("startups".to_string()),
            tick_rate_ms: 100,
            request_timeout_secs: None,
            log_level: None,
            log_dir: None,
        }
    }
}

//! Where setlist keeps its files and how it logs. Read once at startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Filesystem paths for setlist state and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory for runtime state (catalog database, stamp exports).
    /// Default: ~/.local/share/setlist
    #[serde(default = "PathsConfig::default_state_dir")]
    pub state_dir: PathBuf,

    /// SQLite song catalog.
    /// Default: {state_dir}/songs.db
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_db: Option<PathBuf>,

    /// Directory the overlay document is published into.
    /// Default: {state_dir}/obs_viewer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_dir: Option<PathBuf>,
}

impl PathsConfig {
    fn default_state_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.data_dir().join("setlist"))
            .unwrap_or_else(|| PathBuf::from(".local/share/setlist"))
    }

    /// Resolved catalog database path.
    pub fn catalog_db(&self) -> PathBuf {
        self.catalog_db
            .clone()
            .unwrap_or_else(|| self.state_dir.join("songs.db"))
    }

    /// Resolved overlay output directory.
    pub fn overlay_dir(&self) -> PathBuf {
        self.overlay_dir
            .clone()
            .unwrap_or_else(|| self.state_dir.join("obs_viewer"))
    }

    /// Where the stamp transcript is exported on shutdown.
    pub fn stamps_file(&self) -> PathBuf {
        self.state_dir.join("stamps.txt")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: Self::default_state_dir(),
            catalog_db: None,
            overlay_dir: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    /// Defaults to `info`.
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

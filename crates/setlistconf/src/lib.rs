//! Layered configuration for the setlist tools.
//!
//! This crate is imported by every other crate in the workspace, so it keeps
//! its own dependency list small.
//!
//! Two groups of settings live here. [`infra`] holds where state lives and
//! how loudly we log (`PathsConfig`, `TelemetryConfig`), fixed once the
//! process starts. [`display`] holds what the audience sees: overlay look,
//! stamp wording, the BGM fallback files.
//!
//! # Usage
//!
//! ```rust,no_run
//! use setlistconf::SetlistConfig;
//!
//! let config = SetlistConfig::load().expect("Failed to load config");
//! println!("catalog: {}", config.paths.catalog_db().display());
//! println!("overlay: {}", config.overlay.size);
//! ```
//!
//! # Layering
//!
//! Each source overrides the ones above it:
//! 1. `/etc/setlist/config.toml` (system)
//! 2. `~/.config/setlist/config.toml` (user)
//! 3. `./setlist.toml` (local override) or the path passed with `--config`
//! 4. Environment variables (`SETLIST_*`)
//!
//! # Sample `config.toml`
//!
//! ```toml
//! [paths]
//! state_dir = "~/.local/share/setlist"
//! overlay_dir = "~/obs/overlay"
//!
//! [overlay]
//! size = "1280x720"
//! font_scale = 1.0
//! theme = "dark"
//! brand_text = "Live Karaoke"
//!
//! [stamps]
//! start_label = "Start"
//!
//! [bgm]
//! audio_path = "~/Music/waiting.mp3"
//! ```

pub mod display;
pub mod infra;
pub mod loader;

pub use display::{BgmConfig, OverlayConfig, StampsConfig};
pub use infra::{PathsConfig, TelemetryConfig};
pub use loader::{discover_config_files, expand_path, ConfigSources};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Why a config file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

/// Complete setlist configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SetlistConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub overlay: OverlayConfig,

    #[serde(default)]
    pub stamps: StampsConfig,

    #[serde(default)]
    pub bgm: BgmConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl SetlistConfig {
    /// Build the effective config from compiled defaults, the system and
    /// user files, `./setlist.toml`, then `SETLIST_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Like [`Self::load`], with an explicit file taking the place of
    /// `./setlist.toml`. Also reports which files and env vars fed in.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in loader::discover_config_files(config_path) {
            let table = loader::load_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let origin = sources
            .files
            .last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("<defaults>"));
        let mut config = loader::from_table(merged, &origin)?;

        loader::apply_env_overrides(&mut config, &mut sources);
        config.expand_paths();

        Ok((config, sources))
    }

    /// Render the effective config as TOML, for `config show`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(format!("# Setlist Configuration\n\n{body}"))
    }

    fn expand_paths(&mut self) {
        self.paths.state_dir = expand_path(&self.paths.state_dir.to_string_lossy());
        if let Some(db) = self.paths.catalog_db.take() {
            self.paths.catalog_db = Some(expand_path(&db.to_string_lossy()));
        }
        if let Some(dir) = self.paths.overlay_dir.take() {
            self.paths.overlay_dir = Some(expand_path(&dir.to_string_lossy()));
        }
        for slot in [&mut self.bgm.audio_path, &mut self.bgm.video_path] {
            if slot.starts_with("~/") {
                *slot = expand_path(slot).to_string_lossy().into_owned();
            }
        }
    }
}

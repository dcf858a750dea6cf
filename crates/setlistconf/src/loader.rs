//! Finding config files, merging them, and applying `SETLIST_*` env vars.

use crate::{ConfigError, SetlistConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Which files and environment variables shaped the effective config.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Merged in this order, later files winning
    pub files: Vec<PathBuf>,
    pub env_overrides: Vec<String>,
}

/// Existing config files from the system, user and working directories,
/// in merge order. An existing `cli_path` takes the place of `./setlist.toml`.
pub fn discover_config_files(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/setlist/config.toml");
    if system.exists() {
        files.push(system);
    }

    // $XDG_CONFIG_HOME/setlist or ~/.config/setlist
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("setlist/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("setlist.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file into a raw table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Deep-merge `overlay` into `base`. Nested tables merge key by key, any
/// other value in `overlay` replaces the one in `base`.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Deserialize a merged table, filling every missing field with its default.
pub fn from_table(table: toml::Table, origin: &Path) -> Result<SetlistConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
}

/// Overlay `SETLIST_*` (and `RUST_LOG`) values onto a loaded config.
///
/// Values that fail to parse are skipped rather than treated as errors.
pub fn apply_env_overrides(config: &mut SetlistConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("SETLIST_STATE_DIR") {
        config.paths.state_dir = expand_path(&v);
        sources.env_overrides.push("SETLIST_STATE_DIR".to_string());
    }
    if let Ok(v) = env::var("SETLIST_CATALOG_DB") {
        config.paths.catalog_db = Some(expand_path(&v));
        sources.env_overrides.push("SETLIST_CATALOG_DB".to_string());
    }
    if let Ok(v) = env::var("SETLIST_OVERLAY_DIR") {
        config.paths.overlay_dir = Some(expand_path(&v));
        sources.env_overrides.push("SETLIST_OVERLAY_DIR".to_string());
    }

    if let Ok(v) = env::var("SETLIST_OVERLAY_SIZE") {
        config.overlay.size = v;
        sources.env_overrides.push("SETLIST_OVERLAY_SIZE".to_string());
    }
    if let Ok(v) = env::var("SETLIST_FONT_SCALE") {
        if let Ok(scale) = v.parse() {
            config.overlay.font_scale = scale;
            sources.env_overrides.push("SETLIST_FONT_SCALE".to_string());
        }
    }
    if let Ok(v) = env::var("SETLIST_THEME") {
        config.overlay.theme = v;
        sources.env_overrides.push("SETLIST_THEME".to_string());
    }
    if let Ok(v) = env::var("SETLIST_TICK_MS") {
        if let Ok(ms) = v.parse() {
            config.overlay.tick_ms = ms;
            sources.env_overrides.push("SETLIST_TICK_MS".to_string());
        }
    }

    if let Ok(v) = env::var("SETLIST_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("SETLIST_LOG_LEVEL".to_string());
    }
    // RUST_LOG wins over SETLIST_LOG_LEVEL
    if let Ok(v) = env::var("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

/// Expand `~/` and `$VAR/` prefixes in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(stripped);
        }
        return PathBuf::from(path);
    }

    if let Some(stripped) = path.strip_prefix('$') {
        // $VAR or $VAR/rest
        let (var_name, rest) = match stripped.find('/') {
            Some(pos) => (&stripped[..pos], Some(&stripped[pos + 1..])),
            None => (stripped, None),
        };
        return match (env::var(var_name), rest) {
            (Ok(value), Some(rest)) => PathBuf::from(value).join(rest),
            (Ok(value), None) => PathBuf::from(value),
            (Err(_), _) => PathBuf::from(path),
        };
    }

    PathBuf::from(path)
}

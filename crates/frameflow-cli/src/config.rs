//! Configuration – reads/writes `~/.frameflow/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use frameflow_graph::GraphParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Persisted shell configuration stored in `~/.frameflow/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum age of a non-static edge before lookups report
    /// `EXPIRED_CHAIN`, in milliseconds.
    #[serde(default = "default_expire_threshold_ms")]
    pub expire_threshold_ms: u64,

    /// Prompt shown by the interactive shell.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_expire_threshold_ms() -> u64 {
    10_000
}
fn default_prompt() -> String {
    "frameflow>".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expire_threshold_ms: default_expire_threshold_ms(),
            prompt: default_prompt(),
        }
    }
}

impl Config {
    /// Graph params derived from this config.
    pub fn graph_params(&self) -> GraphParams {
        GraphParams::with_expire_threshold(Duration::from_millis(self.expire_threshold_ms))
    }
}

/// Return the path to `~/.frameflow/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".frameflow").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
///
/// Environment overrides are not applied; see [`apply_env_overrides`].
pub fn load() -> Result<Option<Config>, ConfigError> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(toml::from_str(&raw)?))
}

/// Apply `FRAMEFLOW_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `FRAMEFLOW_EXPIRE_MS` | `expire_threshold_ms` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("FRAMEFLOW_EXPIRE_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.expire_threshold_ms = ms;
    }
}

/// Save the config to disk, creating `~/.frameflow/` if necessary.
pub fn save(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_to(cfg, &path)?;
    Ok(path)
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let raw = toml::to_string_pretty(cfg)?;
    fs::write(path, raw).map_err(write_err)
}

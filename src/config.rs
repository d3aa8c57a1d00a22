// File: src/config.rs
use crate::error::Result;
use crate::etymology::graph::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "conscript";

/// Engine settings, read from `<config dir>/conscript/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where the lexicon snapshot lives. `None` keeps everything in memory.
    pub store_path: Option<PathBuf>,
    /// Depth used by ancestry queries that do not pass one.
    pub default_max_depth: usize,
    /// `tracing_subscriber` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            default_max_depth: DEFAULT_MAX_DEPTH,
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Settings for a store that never touches the disk.
    pub fn in_memory() -> Self {
        Self { store_path: None, ..Self::default() }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the config file if there is one. A missing file means defaults;
    /// an unreadable or invalid one is logged and also falls back to defaults.
    pub fn load() -> Self {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Self::default();
            }
        };

        match Self::from_toml(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

fn default_store_path() -> Option<PathBuf> {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join(APP_DIR).join("lexicon.bin"))
}

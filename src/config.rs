// src/config.rs
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filesystem::SortBy;

const APP_DIR: &str = "panefm";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub start_path: Option<PathBuf>,
    pub show_hidden: bool,
    pub sort_by: SortBy,
    /// Paste a directory into an existing one of the same name instead of refusing.
    pub merge_on_paste: bool,
    /// Children shown when summarising the highlighted directory.
    pub preview_entries: usize,
    /// Bytes read from a text file for the preview pane.
    pub preview_bytes: usize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            start_path: None,
            show_hidden: false,
            sort_by: SortBy::Name,
            merge_on_paste: false,
            preview_entries: 15,
            preview_bytes: 2000,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    pub fn default_log_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join(APP_DIR).join("panefm.log"))
    }

    /// Load from `path`; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Config::default()),
        }
    }
}

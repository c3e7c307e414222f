use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};

pub const DEFAULT_STORAGE_KEY: &str = "pmatrix-v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the stored board and the log file.
    pub data_dir: PathBuf,
    pub storage_key: String,
    /// Used when `RUST_LOG` is unset.
    pub log_level: String,
    pub tick_rate_ms: u64,
    /// Initial value of the hide-completed filter.
    pub hide_completed: bool,
    /// Where exports go when no directory is given.
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: "quadrant=info".to_string(),
            tick_rate_ms: 100,
            hide_completed: false,
            export_dir: PathBuf::from("."),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("quadrant")
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BoardError::Config(e.to_string()))
    }

    /// Like [`Config::from_file`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::from_file(path) {
            Err(BoardError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| BoardError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// `~/.config/quadrant/config.toml` on Linux, the platform equivalent elsewhere.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("quadrant")
            .join("config.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("quadrant.log")
    }
}

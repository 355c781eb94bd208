/// Application configuration
///
/// Loaded from `config.json` in the application data directory:
/// - Linux: ~/.local/share/instafilter/config.json
/// - macOS: ~/Library/Application Support/instafilter/config.json
/// - Windows: %APPDATA%\instafilter\config.json
///
/// Every field is optional; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::state::review::DEFAULT_REVIEW_THRESHOLD;

const APP_DIR: &str = "instafilter";
const CONFIG_FILE: &str = "config.json";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("default_intensity {0} is outside 0.0..=1.0")]
    Intensity(f64),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Photos are downscaled so neither side exceeds this (0 = never downscale)
    pub working_max_dimension: u32,
    /// Filter changes that must be exceeded before the review prompt
    pub review_threshold: u64,
    /// Slider position at launch
    pub default_intensity: f64,
    /// Settings database file name, relative to the data directory
    pub settings_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_max_dimension: 1280,
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
            default_intensity: 0.5,
            settings_file: "instafilter.db".to_string(),
        }
    }
}

impl AppConfig {
    /// Load the config from the data directory, falling back to defaults
    /// when the file is missing or broken
    pub fn load() -> Self {
        let path = data_dir().join(CONFIG_FILE);

        match Self::from_file(&path) {
            Ok(Some(config)) => {
                log::info!("⚙️  Loaded config from {}", path.display());
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("⚠️  Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse a config file. Ok(None) if it doesn't exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map(Some)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if !(0.0..=1.0).contains(&config.default_intensity) {
            return Err(ConfigError::Intensity(config.default_intensity));
        }

        Ok(config)
    }

    /// Full path of the settings database
    pub fn settings_path(&self) -> PathBuf {
        data_dir().join(&self.settings_file)
    }
}

/// Per-user application data directory
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push(APP_DIR);
    path
}

//! Configuration management for Tallykeeper
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, TallyError};
use crate::sessions::DEFAULT_STORAGE_KEY;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Tallykeeper
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where and how the session collection is persisted
    #[serde(default)]
    pub storage: StorageConfig,
    /// Attached photo handling
    #[serde(default)]
    pub images: ImagesConfig,
    /// Input conventions shared by the screens
    #[serde(default)]
    pub ui: UiConfig,
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database directory for the embedded key-value store
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Key the session collection is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// Report unreadable session data instead of showing an empty list
    #[serde(default)]
    pub strict_reads: bool,
}

fn data_dir() -> PathBuf {
    ProjectDirs::from("com", "tallykeeper", "tallykeeper")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".tallykeeper"))
}

fn default_storage_path() -> PathBuf {
    data_dir().join("sessions.db")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            key: default_storage_key(),
            strict_reads: false,
        }
    }
}

/// Image picking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Directory picked images are copied into
    #[serde(default = "default_images_dir")]
    pub dir: PathBuf,

    /// Crop picked images to the configured aspect ratio
    #[serde(default = "default_allow_editing")]
    pub allow_editing: bool,

    #[serde(default = "default_aspect_width")]
    pub aspect_width: u32,

    #[serde(default = "default_aspect_height")]
    pub aspect_height: u32,

    /// JPEG quality in (0.0, 1.0]
    #[serde(default = "default_quality")]
    pub quality: f32,
}

fn default_images_dir() -> PathBuf {
    data_dir().join("images")
}

fn default_allow_editing() -> bool {
    true
}

fn default_aspect_width() -> u32 {
    4
}

fn default_aspect_height() -> u32 {
    3
}

fn default_quality() -> f32 {
    0.8
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: default_images_dir(),
            allow_editing: default_allow_editing(),
            aspect_width: default_aspect_width(),
            aspect_height: default_aspect_height(),
            quality: default_quality(),
        }
    }
}

/// User input conventions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Longest accepted session name, in characters
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

fn default_max_name_length() -> usize {
    50
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_name_length: default_max_name_length(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TallyError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TallyError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(db) = std::env::var("TALLYKEEPER_DB") {
            tracing::debug!(db = %db, "Env override: TALLYKEEPER_DB");
            self.storage.path = PathBuf::from(db);
        }

        if let Ok(key) = std::env::var("TALLYKEEPER_STORAGE_KEY") {
            tracing::debug!(key = %key, "Env override: TALLYKEEPER_STORAGE_KEY");
            self.storage.key = key;
        }

        if let Ok(dir) = std::env::var("TALLYKEEPER_IMAGES_DIR") {
            tracing::debug!(dir = %dir, "Env override: TALLYKEEPER_IMAGES_DIR");
            self.images.dir = PathBuf::from(dir);
        }

        if let Ok(quality) = std::env::var("TALLYKEEPER_IMAGE_QUALITY") {
            if let Ok(v) = quality.parse::<f32>() {
                self.images.quality = v;
            } else {
                tracing::warn!("Invalid TALLYKEEPER_IMAGE_QUALITY: {}", quality);
            }
        }

        if let Ok(max_len) = std::env::var("TALLYKEEPER_MAX_NAME_LENGTH") {
            if let Ok(v) = max_len.parse::<usize>() {
                self.ui.max_name_length = v;
            } else {
                tracing::warn!("Invalid TALLYKEEPER_MAX_NAME_LENGTH: {}", max_len);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(db_path) = &cli.storage_path {
            tracing::info!("Using storage DB override from CLI: {}", db_path);
            self.storage.path = PathBuf::from(db_path);
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `TallyError::Config` naming the first invalid field
    pub fn validate(&self) -> Result<()> {
        if self.storage.key.trim().is_empty() {
            return Err(TallyError::Config("storage.key cannot be empty".to_string()).into());
        }

        if self.storage.path.as_os_str().is_empty() {
            return Err(TallyError::Config("storage.path cannot be empty".to_string()).into());
        }

        if self.images.aspect_width == 0 || self.images.aspect_height == 0 {
            return Err(TallyError::Config(
                "images.aspect_width and images.aspect_height must be greater than 0".to_string(),
            )
            .into());
        }

        if !(self.images.quality > 0.0 && self.images.quality <= 1.0) {
            return Err(TallyError::Config(
                "images.quality must be between 0.0 and 1.0".to_string(),
            )
            .into());
        }

        if self.ui.max_name_length == 0 {
            return Err(
                TallyError::Config("ui.max_name_length must be greater than 0".to_string()).into(),
            );
        }

        Ok(())
    }
}

//! Configuration management for the skin head editor.
//!
//! Handles loading, saving, and validating configuration from JSON files.

use crate::texture::Adjustments;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Upper bound on download attempts
pub const MAX_DOWNLOAD_RETRIES: u32 = 10;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "skin-head-editor.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Texture download settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSettings {
    /// Attempts per download, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each further retry
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Largest accepted texture edge in pixels
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_dimension() -> u32 {
    4096
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            max_dimension: default_max_dimension(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Adjustments applied when rendering
    #[serde(default)]
    pub adjustments: Adjustments,

    /// Texture download behaviour
    #[serde(default)]
    pub download: DownloadSettings,

    /// Scale factor for preview images
    #[serde(default = "default_preview_scale")]
    pub preview_scale: u32,

    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

fn default_preview_scale() -> u32 {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adjustments: Adjustments::default(),
            download: DownloadSettings::default(),
            preview_scale: default_preview_scale(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file atomically
    ///
    /// Writes to a temporary file and renames it over the target, so an
    /// interrupted save never leaves a truncated config behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)?;

        std::fs::rename(&tmp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            ConfigError::ReadError(e)
        })?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_adjustments(&self.adjustments)?;

        if self.preview_scale < 1 || self.preview_scale > 32 {
            return Err(ConfigError::ValidationError(
                "preview_scale must be between 1 and 32".to_string(),
            ));
        }

        if self.download.max_retries < 1 || self.download.max_retries > MAX_DOWNLOAD_RETRIES {
            return Err(ConfigError::ValidationError(format!(
                "download.max_retries must be between 1 and {}",
                MAX_DOWNLOAD_RETRIES
            )));
        }

        if self.download.timeout_secs < 1 {
            return Err(ConfigError::ValidationError(
                "download.timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.download.max_dimension < 64 {
            return Err(ConfigError::ValidationError(
                "download.max_dimension must be at least 64".to_string(),
            ));
        }

        Ok(())
    }
}

/// Check every adjustment against its accepted range
///
/// Also used for values supplied on the command line.
pub fn validate_adjustments(adjustments: &Adjustments) -> Result<(), ConfigError> {
    let ranges = [
        ("hue_shift", adjustments.hue_shift, -360.0, 360.0),
        ("saturation", adjustments.saturation, -100.0, 100.0),
        ("lightness", adjustments.lightness, -100.0, 100.0),
        ("contrast", adjustments.contrast, -255.0, 255.0),
        ("colorize_hue", adjustments.colorize_hue, 0.0, 360.0),
        ("colorize_amount", adjustments.colorize_amount, 0.0, 1.0),
        ("target_hue", adjustments.target_hue, 0.0, 360.0),
        ("hue_range", adjustments.hue_range, 0.0, 180.0),
        ("grey_amount", adjustments.grey_amount, 0.0, 1.0),
    ];

    for (name, value, min, max) in ranges {
        if !(min..=max).contains(&value) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between {} and {}, got {}",
                name, min, max, value
            )));
        }
    }

    Ok(())
}

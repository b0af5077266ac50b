//! Configuration file handling.
//!
//! This module provides loading and saving of omrgrade configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/omrgrade/config.toml`
//! - macOS: `~/Library/Application Support/omrgrade/config.toml`
//! - Windows: `%APPDATA%\omrgrade\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! default_format = "table"
//!
//! [detection]
//! min_area = 10
//! max_area = 150
//! fill_threshold = 0.5
//! choices_per_question = 5
//!
//! [scoring]
//! wrong_penalty = 0.25
//! pass_mark = 40.0
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8501
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OmrError;

/// Environment variable that overrides the configured server port.
pub const PORT_ENV: &str = "PORT";

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use omrgrade::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Pass mark: {}%", config.scoring.pass_mark);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json", "csv", "html"
    /// Default: "table"
    pub default_format: String,

    /// Bubble detection tuning.
    pub detection: DetectionConfig,

    /// Scoring rules.
    pub scoring: ScoringConfig,

    /// HTTP server settings.
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: "table".to_string(),
            detection: DetectionConfig::default(),
            scoring: ScoringConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Thresholds used to find and read bubbles.
///
/// Areas are bounding-box areas in pixels; distances are in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Gaussian blur kernel size (odd).
    pub blur_kernel: u32,
    /// Adaptive threshold window size (odd, at least 3).
    pub block_size: u32,
    /// Constant subtracted from the local mean.
    pub threshold_c: f32,
    /// Candidates must be strictly larger than this.
    pub min_area: u32,
    /// Candidates must be strictly smaller than this.
    pub max_area: u32,
    pub min_aspect: f32,
    pub max_aspect: f32,
    /// Luma below which a pixel counts as ink when measuring fill.
    pub dark_level: u8,
    /// Fraction of a bubble that must be dark for it to count as marked.
    pub fill_threshold: f32,
    /// Vertical distance within which bubble centers share a row.
    pub row_tolerance: u32,
    /// Horizontal gap that separates two question blocks on one row.
    pub block_gap: u32,
    /// Bubbles per question (A..E).
    pub choices_per_question: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            block_size: 11,
            threshold_c: 2.0,
            min_area: 10,
            max_area: 150,
            min_aspect: 0.8,
            max_aspect: 1.2,
            dark_level: 128,
            fill_threshold: 0.5,
            row_tolerance: 10,
            block_gap: 50,
            choices_per_question: 5,
        }
    }
}

impl DetectionConfig {
    /// Rejects settings the detector cannot work with.
    pub fn validate(&self) -> Result<(), OmrError> {
        if self.blur_kernel % 2 == 0 {
            return Err(OmrError::Config(format!(
                "detection.blur_kernel must be odd, got {}",
                self.blur_kernel
            )));
        }
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(OmrError::Config(format!(
                "detection.block_size must be odd and >= 3, got {}",
                self.block_size
            )));
        }
        if self.min_area >= self.max_area {
            return Err(OmrError::Config(
                "detection.min_area must be below detection.max_area".to_string(),
            ));
        }
        if self.min_aspect >= self.max_aspect {
            return Err(OmrError::Config(
                "detection.min_aspect must be below detection.max_aspect".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fill_threshold) {
            return Err(OmrError::Config(format!(
                "detection.fill_threshold must be within 0..=1, got {}",
                self.fill_threshold
            )));
        }
        if self.choices_per_question == 0 || self.choices_per_question > 5 {
            return Err(OmrError::Config(format!(
                "detection.choices_per_question must be within 1..=5, got {}",
                self.choices_per_question
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points deducted per wrong answer. 0 disables negative marking.
    pub wrong_penalty: f64,
    /// Minimum accuracy percentage for a pass.
    pub pass_mark: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            wrong_penalty: 0.0,
            pass_mark: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit for uploads, in megabytes.
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
            max_upload_mb: 50,
        }
    }
}

impl ServerConfig {
    /// Picks the listening port: an explicit flag wins, then the `PORT`
    /// value, then the configured port. Unparseable `PORT` values are ignored.
    pub fn resolve_port(&self, flag: Option<u16>, env_port: Option<&str>) -> u16 {
        if let Some(port) = flag {
            return port;
        }
        env_port
            .and_then(|p| p.trim().parse::<u16>().ok())
            .unwrap_or(self.port)
    }
}

impl Config {
    /// Loads configuration from the default config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// detection settings the detector rejects.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.detection.validate()?;
        Ok(config)
    }

    /// Saves the configuration to `path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use omrgrade::Config;
    ///
    /// let path = Config::config_path();
    /// println!("Config file: {}", path.display());
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("omrgrade")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

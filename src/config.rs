//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::fineoffset::protocol::Family;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub decoders: DecodersConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Which decoder entry points run on every row
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DecodersConfig {
    #[serde(default = "default_enabled")]
    pub enabled: Vec<Family>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    /// Empty logs to stderr, otherwise a daily rolling file in this directory
    #[serde(default)]
    pub log_dir: String,
}

/// Record output configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,
}

// Default value functions
fn default_enabled() -> Vec<Family> { Family::ALL.to_vec() }

fn default_level() -> String { "info".to_string() }

fn default_timestamps() -> bool { true }

impl Default for DecodersConfig {
    fn default() -> Self {
        Self { enabled: default_enabled() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            log_dir: String::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { timestamps: default_timestamps() }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails (including unknown decoder names)
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fineoffset_decoder::config::Config;
    ///
    /// let config = Config::load("fineoffset.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if the decoder list is empty or repeats a family, or the
    /// log level is not recognized
    pub fn validate(&self) -> Result<()> {
        if self.decoders.enabled.is_empty() {
            return Err(crate::error::Error::Config(
                toml::de::Error::custom("decoders.enabled cannot be empty")
            ));
        }

        for (i, family) in self.decoders.enabled.iter().enumerate() {
            if self.decoders.enabled[..i].contains(family) {
                return Err(crate::error::Error::Config(
                    toml::de::Error::custom(format!("decoder {} is enabled twice", family))
                ));
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(crate::error::Error::Config(
                toml::de::Error::custom(format!(
                    "logging.level must be one of: {}",
                    LOG_LEVELS.join(", ")
                ))
            ));
        }

        Ok(())
    }
}

//! Engine configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) is a valid
//! configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for the `pixelbayes` binary.
///
/// # Examples
///
/// ```
/// use pixelbayes::EngineConfig;
///
/// let config = EngineConfig::from_toml_str("[paths]\nmodel = \"out/model.txt\"\n").unwrap();
/// assert_eq!(config.paths.model.to_str(), Some("out/model.txt"));
/// assert_eq!(config.logging.filter, "info");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Labeled corpus used by `train`
    pub training_corpus: PathBuf,
    /// Held-out labeled corpus used by `accuracy`
    pub test_corpus: PathBuf,
    /// Serialized model written by `train` and read by `accuracy`/`predict`
    pub model: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            training_corpus: PathBuf::from("data/trainingimagesandlabels.txt"),
            test_corpus: PathBuf::from("data/testimagesandlabels.txt"),
            model: PathBuf::from("saved/model.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error while reading config: {err}"),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

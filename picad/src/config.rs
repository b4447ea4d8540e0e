//! TOML board configuration
//!
//! Settings live under a `[board]` table; every key is optional and falls
//! back to the PiFace defaults. See `board.toml` for the full set.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::info;
use picad_core::config::{BoardConfig, ConfigError};
use serde::Deserialize;

/// Default configuration, with every key spelled out
pub const DEFAULT_CONFIG: &str = include_str!("../board.toml");

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    board: BoardConfig,
}

/// Configuration loading errors
#[derive(Debug)]
pub enum LoadError {
    /// File could not be read
    Io(io::Error),
    /// Not valid TOML or wrong value types
    Parse(toml::de::Error),
    /// Parsed but not usable
    Invalid(ConfigError),
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<toml::de::Error> for LoadError {
    fn from(e: toml::de::Error) -> Self {
        LoadError::Parse(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "failed to read config: {}", e),
            LoadError::Parse(e) => write!(f, "failed to parse config: {}", e),
            LoadError::Invalid(ConfigError::InvalidHwAddress(addr)) => {
                write!(f, "hw_address {} out of range (0-7)", addr)
            }
            LoadError::Invalid(ConfigError::ZeroPollInterval) => {
                write!(f, "poll_interval_ms must be non-zero")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Parse(e) => Some(e),
            LoadError::Invalid(_) => None,
        }
    }
}

/// Parse and validate a configuration string
pub fn load_str(text: &str) -> Result<BoardConfig, LoadError> {
    let file: ConfigFile = toml::from_str(text)?;
    file.board.validate()?;
    Ok(file.board)
}

/// Read, parse and validate a configuration file
pub fn load_file(path: impl AsRef<Path>) -> Result<BoardConfig, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let config = load_str(&text)?;
    info!("loaded board config from {}", path.display());
    Ok(config)
}

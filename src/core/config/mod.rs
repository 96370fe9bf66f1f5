//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first hit wins:
//! 1. Explicit path (`--config`), which must exist
//! 2. `$SLOTWISE_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/slotwise/config.toml`
//! 4. `~/.slotwise/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use slotwise::core::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! println!("Slots: {}", result.config.slot_count());
//! if let Some(path) = result.path {
//!     println!("Loaded from {}", path.display());
//! }
//! ```

pub mod schema;

pub use schema::HarnessConfig;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "SLOTWISE_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: HarnessConfig,
    /// The file it came from, if any.
    pub path: Option<PathBuf>,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Configuration loader.
pub struct Config;

impl Config {
    /// Load configuration.
    ///
    /// If `explicit` is provided, only that file is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed, or
    /// holds invalid values. Missing files in the default locations are
    /// not an error (defaults are used).
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::search(std::env::var_os(CONFIG_ENV).map(PathBuf::from), &mut warnings),
        };

        let config = match &path {
            Some(path) => Self::read_config(path)?,
            None => HarnessConfig::default(),
        };
        config.validate()?;

        Ok(ConfigLoadResult {
            config,
            path,
            warnings,
        })
    }

    /// Find the first existing config file in the default locations.
    fn search(env_path: Option<PathBuf>, warnings: &mut Vec<ConfigWarning>) -> Option<PathBuf> {
        // 1. Check $SLOTWISE_CONFIG
        if let Some(path) = env_path {
            if path.exists() {
                return Some(path);
            }
            warnings.push(ConfigWarning {
                message: format!("${} points to a missing file, ignoring it", CONFIG_ENV),
                path,
            });
        }

        // 2. Check $XDG_CONFIG_HOME/slotwise/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("slotwise/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.slotwise/config.toml
        dirs::home_dir()
            .map(|home| home.join(".slotwise/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    pub fn read_config(path: &Path) -> Result<HarnessConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

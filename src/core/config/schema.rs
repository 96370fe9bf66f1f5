//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing and again after CLI
//! overrides are applied, so an out-of-range `--slots` is caught the same
//! way as an out-of-range file value.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Slots per kind when nothing is configured.
pub const DEFAULT_SLOT_COUNT: usize = 10;

/// Largest accepted slot count.
pub const MAX_SLOT_COUNT: usize = 1000;

/// Harness configuration.
///
/// # Example
///
/// ```toml
/// slot_count = 10
/// node_limit = 4096
/// shuffle_seed = 42
/// echo = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Slots per container kind
    pub slot_count: Option<usize>,

    /// Maximum live nodes per node pool
    pub node_limit: Option<usize>,

    /// Seed for `list_shuffle`
    pub shuffle_seed: Option<u64>,

    /// Echo each input line before its result
    pub echo: Option<bool>,
}

impl HarnessConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(count) = self.slot_count {
            if !(1..=MAX_SLOT_COUNT).contains(&count) {
                return Err(ConfigError::InvalidValue(format!(
                    "slot_count must be between 1 and {}, got {}",
                    MAX_SLOT_COUNT, count
                )));
            }
        }

        if self.node_limit == Some(0) {
            return Err(ConfigError::InvalidValue(
                "node_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Slots per kind.
    ///
    /// Defaults to 10 if not configured.
    pub fn slot_count(&self) -> usize {
        self.slot_count.unwrap_or(DEFAULT_SLOT_COUNT)
    }

    /// Node cap per pool, or `None` for unbounded.
    pub fn node_limit(&self) -> Option<usize> {
        self.node_limit
    }

    /// Fixed shuffle seed, or `None` to seed from the OS.
    pub fn shuffle_seed(&self) -> Option<u64> {
        self.shuffle_seed
    }

    /// Whether input lines are echoed.
    ///
    /// Defaults to `false` if not configured.
    pub fn echo(&self) -> bool {
        self.echo.unwrap_or(false)
    }
}

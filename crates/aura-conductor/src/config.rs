//! Conductor configuration
//!
//! Loaded from TOML or JSON, optionally overridden by `AURA_CONDUCTOR_*`
//! environment variables, then validated before a conductor is built.

use crate::errors::{ConductorError, ConductorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "AURA_CONDUCTOR_";

/// Default number of retained collection deltas.
pub const DEFAULT_CHANGE_LOG_CAPACITY: usize = 64;

/// Largest accepted change log capacity.
pub const MAX_CHANGE_LOG_CAPACITY: usize = 1 << 16;

/// Runtime configuration for a [`OneActiveConductor`](crate::OneActiveConductor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductorConfig {
    /// Ignore a close request for an item whose guard has not answered yet
    pub deduplicate_pending_closes: bool,
    /// Deltas retained for lagging [`ItemsSubscription`](crate::ItemsSubscription)s
    pub change_log_capacity: usize,
    /// Report the individually closable members from the default close strategy
    pub close_conducted_items: bool,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            deduplicate_pending_closes: true,
            change_log_capacity: DEFAULT_CHANGE_LOG_CAPACITY,
            close_conducted_items: false,
        }
    }
}

impl ConductorConfig {
    /// Load configuration from a `.toml` or `.json` file.
    pub fn load_from_file(path: &Path) -> ConductorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConductorError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| ConductorError::invalid(format!("Invalid TOML: {e}")))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ConductorError::invalid(format!("Invalid JSON: {e}")))?,
            _ => return Err(ConductorError::invalid("Unsupported file format")),
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply `AURA_CONDUCTOR_*` overrides from the process environment.
    pub fn merge_with_env(&mut self) -> ConductorResult<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply overrides from `(name, value)` pairs; unknown names are ignored.
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> ConductorResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match name {
                "DEDUPLICATE_PENDING_CLOSES" => {
                    self.deduplicate_pending_closes = parse_bool(key.as_ref(), value)?;
                }
                "CHANGE_LOG_CAPACITY" => {
                    self.change_log_capacity = value.parse().map_err(|_| {
                        ConductorError::invalid(format!("Invalid capacity in {}", key.as_ref()))
                    })?;
                }
                "CLOSE_CONDUCTED_ITEMS" => {
                    self.close_conducted_items = parse_bool(key.as_ref(), value)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConductorResult<()> {
        if self.change_log_capacity == 0 {
            return Err(ConductorError::invalid(
                "change_log_capacity must be greater than 0",
            ));
        }
        if self.change_log_capacity > MAX_CHANGE_LOG_CAPACITY {
            return Err(ConductorError::invalid(format!(
                "change_log_capacity must be at most {MAX_CHANGE_LOG_CAPACITY}"
            )));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> ConductorResult<bool> {
    value
        .parse()
        .map_err(|_| ConductorError::invalid(format!("Invalid boolean in {key}")))
}

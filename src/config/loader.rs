//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::EngineConfig;

/// Loads and provides access to engine configuration.
///
/// # Example
///
/// ```no_run
/// use site_ledger::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/engine.yaml").unwrap();
/// println!("Rest day: {}", loader.config().rest_day);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the YAML file at `path`.
    ///
    /// Returns `ConfigNotFound` if the file cannot be read and
    /// `ConfigParseError` if it is not valid configuration YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content, &path_str)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Example
    ///
    /// ```
    /// use site_ledger::config::{AllocationPolicyKind, ConfigLoader};
    ///
    /// let loader = ConfigLoader::from_yaml_str("allocation_policy: due_weighted\n")?;
    /// assert_eq!(loader.config().allocation_policy, AllocationPolicyKind::DueWeighted);
    /// # Ok::<(), site_ledger::error::EngineError>(())
    /// ```
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        Self::parse(content, "<inline>")
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    fn parse(content: &str, origin: &str) -> EngineResult<Self> {
        // An empty document is valid and means "all defaults".
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config =
            serde_yaml::from_str::<EngineConfig>(content).map_err(|e| {
                EngineError::ConfigParseError {
                    path: origin.to_string(),
                    message: e.to_string(),
                }
            })?;

        Ok(Self { config })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

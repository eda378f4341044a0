//! Suite settings
//!
//! Loadable from YAML. The `generation` section is handed to the argument
//! generator unchanged.

use crate::error::{Error, Result};
use autoprop_gen::{DEFAULT_LIMIT, GenerationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for running generated cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Argument bundles generated per target
    pub runs: usize,
    /// Worker threads used by the suite runner
    pub workers: usize,
    /// Skip remaining cases after the first failure
    pub stop_on_failure: bool,
    /// Value generation settings
    pub generation: GenerationConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_LIMIT,
            workers: num_cpus::get().min(4),
            stop_on_failure: false,
            generation: GenerationConfig::default(),
        }
    }
}

impl SuiteConfig {
    /// Set the worker count
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set stop-on-failure
    #[must_use]
    pub const fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Check worker count and generation settings
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for zero workers, or the generation
    /// config error.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be at least 1".to_string()));
        }
        self.generation.validate()?;
        Ok(())
    }

    /// Parse and validate a YAML document
    ///
    /// # Errors
    ///
    /// Returns an error on malformed YAML or invalid settings.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }
}

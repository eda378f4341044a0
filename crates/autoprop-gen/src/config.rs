//! Generation settings
//!
//! Bounds applied when deriving strategies from type hints, plus the optional
//! RNG seed. Loadable from YAML; every field has a default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for type-derived value generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Seed for reproducible sampling; random when absent
    pub seed: Option<u64>,
    /// Smallest generated `int`
    pub int_min: i64,
    /// Largest generated `int`
    pub int_max: i64,
    /// Smallest generated `float`
    pub float_min: f64,
    /// Largest generated `float`
    pub float_max: f64,
    /// Regex describing generated `str` values
    pub string_pattern: String,
    /// Upper bound on generated list and dict sizes
    pub max_collection_len: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            int_min: i64::from(i32::MIN),
            int_max: i64::from(i32::MAX),
            float_min: -1.0e9,
            float_max: 1.0e9,
            string_pattern: "\\PC{0,32}".to_string(),
            max_collection_len: 8,
        }
    }
}

impl GenerationConfig {
    /// Set the sampling seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the integer range
    #[must_use]
    pub const fn with_int_range(mut self, min: i64, max: i64) -> Self {
        self.int_min = min;
        self.int_max = max;
        self
    }

    /// Set the maximum collection length
    #[must_use]
    pub const fn with_max_collection_len(mut self, len: usize) -> Self {
        self.max_collection_len = len;
        self
    }

    /// Check that ranges are non-empty and finite
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` describing the first bad setting.
    pub fn validate(&self) -> Result<()> {
        if self.int_min > self.int_max {
            return Err(Error::InvalidConfig(format!(
                "int_min {} is greater than int_max {}",
                self.int_min, self.int_max
            )));
        }
        if !self.float_min.is_finite() || !self.float_max.is_finite() {
            return Err(Error::InvalidConfig(
                "float bounds must be finite".to_string(),
            ));
        }
        if self.float_min > self.float_max {
            return Err(Error::InvalidConfig(format!(
                "float_min {} is greater than float_max {}",
                self.float_min, self.float_max
            )));
        }
        proptest::string::string_regex(&self.string_pattern).map(drop).map_err(|e| {
            Error::InvalidConfig(format!("string_pattern `{}`: {e}", self.string_pattern))
        })?;
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

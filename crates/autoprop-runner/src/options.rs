//! Per-target pipeline options

use crate::config::SuiteConfig;
use crate::scenario::Scenario;
use crate::verify::{AllowedErrors, Verifier};
use autoprop_gen::{DEFAULT_LIMIT, GenerationConfig, Override, Overrides, Raised};
use std::sync::Arc;

/// Overrides, allow-list, verifier and bounds for one pipeline run
pub struct AutoOptions {
    pub(crate) overrides: Overrides,
    pub(crate) allowed: AllowedErrors,
    pub(crate) verifier: Option<Verifier>,
    pub(crate) runs: usize,
    pub(crate) generation: GenerationConfig,
}

impl Default for AutoOptions {
    fn default() -> Self {
        Self {
            overrides: Overrides::new(),
            allowed: AllowedErrors::new(),
            verifier: None,
            runs: DEFAULT_LIMIT,
            generation: GenerationConfig::default(),
        }
    }
}

impl std::fmt::Debug for AutoOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoOptions")
            .field("overrides", &self.overrides)
            .field("allowed", &self.allowed)
            .field("verifier", &self.verifier.is_some())
            .field("runs", &self.runs)
            .field("generation", &self.generation)
            .finish()
    }
}

impl AutoOptions {
    /// Defaults: no overrides, nothing allowed, 50 runs
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs and generation settings taken from a suite config
    #[must_use]
    pub fn from_config(config: &SuiteConfig) -> Self {
        Self {
            runs: config.runs,
            generation: config.generation.clone(),
            ..Self::default()
        }
    }

    /// Append a positional override
    #[must_use]
    pub fn arg(mut self, value: impl Into<Override>) -> Self {
        self.overrides = self.overrides.arg(value);
        self
    }

    /// Add a named override
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Override>) -> Self {
        self.overrides = self.overrides.kwarg(name, value);
        self
    }

    /// Replace all overrides
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Treat errors of type `E` as acceptable
    #[must_use]
    pub fn allow<E: std::error::Error + 'static>(mut self) -> Self {
        self.allowed = self.allowed.allow::<E>();
        self
    }

    /// Run `verifier` against every successful invocation
    #[must_use]
    pub fn verify<F>(mut self, verifier: F) -> Self
    where
        F: Fn(&Scenario<'_>) -> std::result::Result<(), Raised> + Send + Sync + 'static,
    {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Number of argument bundles to generate
    #[must_use]
    pub const fn runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Replace the generation settings
    #[must_use]
    pub fn generation(mut self, config: GenerationConfig) -> Self {
        self.generation = config;
        self
    }

    /// Fix the sampling seed
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.generation.seed = Some(seed);
        self
    }

    /// Configured run count
    #[must_use]
    pub const fn run_count(&self) -> usize {
        self.runs
    }

    /// Configured generation settings
    #[must_use]
    pub const fn generation_config(&self) -> &GenerationConfig {
        &self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = AutoOptions::new();
        assert_eq!(options.run_count(), 50);
        assert!(options.overrides.is_empty());
        assert!(options.allowed.is_empty());
        assert!(options.verifier.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = AutoOptions::new()
            .arg(json!(1))
            .kwarg("b", json!(2))
            .allow::<std::fmt::Error>()
            .verify(|_| Ok(()))
            .runs(7)
            .seed(99);
        assert_eq!(options.run_count(), 7);
        assert_eq!(options.generation_config().seed, Some(99));
        assert!(!options.overrides.is_empty());
        assert!(!options.allowed.is_empty());
        assert!(format!("{options:?}").contains("verifier: true"));
    }

    #[test]
    fn test_from_config() {
        let config = SuiteConfig {
            runs: 12,
            generation: GenerationConfig::default().with_seed(5),
            ..SuiteConfig::default()
        };
        let options = AutoOptions::from_config(&config);
        assert_eq!(options.run_count(), 12);
        assert_eq!(options.generation_config().seed, Some(5));
    }
}

//! Error types for autoprop-runner

use autoprop_gen::{Raised, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Fault category of a failed pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Pipeline could not be built
    Configuration,
    /// Target raised an error outside the allow-list
    Unexpected,
    /// Target returned a value that does not match its declared type
    ReturnContract,
    /// Verifier rejected the scenario
    Verification,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Unexpected => write!(f, "unexpected"),
            Self::ReturnContract => write!(f, "return-contract"),
            Self::Verification => write!(f, "verification"),
        }
    }
}

/// Errors that can occur while building or running test cases
#[derive(Debug, Error)]
pub enum Error {
    /// Generation-side configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] autoprop_gen::Error),

    /// Runner settings are inconsistent
    #[error("Invalid suite config: {0}")]
    InvalidConfig(String),

    /// Target raised an error that is not allowed
    #[error("Unexpected error from `{target}`: {source}")]
    Unexpected {
        /// Target name
        target: String,
        /// The error exactly as raised
        source: Raised,
    },

    /// Return value violates the declared return type
    #[error("Return contract violated by `{target}`: {source}")]
    ReturnContract {
        /// Target name
        target: String,
        /// Offending return value
        result: Value,
        /// Conformance failure
        source: ValidationError,
    },

    /// Verifier rejected the scenario
    #[error("Verification failed for `{target}`: {source}")]
    Verification {
        /// Target name
        target: String,
        /// Verifier failure
        source: Raised,
    },

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Fault category of this error
    #[must_use]
    pub const fn category(&self) -> FailureCategory {
        match self {
            Self::Unexpected { .. } => FailureCategory::Unexpected,
            Self::ReturnContract { .. } => FailureCategory::ReturnContract,
            Self::Verification { .. } => FailureCategory::Verification,
            Self::Config(_)
            | Self::InvalidConfig(_)
            | Self::ThreadPool(_)
            | Self::JsonError(_)
            | Self::YamlError(_)
            | Self::IoError(_) => FailureCategory::Configuration,
        }
    }

    /// The error raised by the target or verifier, if any
    #[must_use]
    pub fn raised(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Unexpected { source, .. } | Self::Verification { source, .. } => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }

    /// Take ownership of the raised error, if any
    #[must_use]
    pub fn into_raised(self) -> Option<Raised> {
        match self {
            Self::Unexpected { source, .. } | Self::Verification { source, .. } => Some(source),
            _ => None,
        }
    }
}

//! Error types for autoprop-gen
//!
//! Every variant here is a configuration fault: it is raised while building
//! the pipeline or sampling arguments, never by the function under test.

use thiserror::Error;

/// Result type alias for autoprop-gen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while introspecting, resolving or generating
#[derive(Debug, Error)]
pub enum Error {
    /// Target was registered without parameter metadata
    #[error("No signature available for {0}")]
    MissingSignature(String),

    /// Signature declaration is malformed
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Parameter has no override, no declared type and no default
    #[error("Cannot synthesize values for parameter `{param}`: no type hint, override or default")]
    MissingStrategy {
        /// Parameter name
        param: String,
    },

    /// Named override does not match any parameter
    #[error("Override given for unknown parameter `{0}`")]
    UnknownParameter(String),

    /// Parameter was overridden positionally and by name
    #[error("Parameter `{0}` overridden both positionally and by name")]
    DuplicateOverride(String),

    /// More positional overrides than positional parameters
    #[error("Got {given} positional overrides but only {accepted} positional parameters")]
    TooManyPositional {
        /// Number of positional overrides supplied
        given: usize,
        /// Number of parameters that accept positional values
        accepted: usize,
    },

    /// Type hint text could not be parsed
    #[error("Invalid type hint `{input}`: {reason}")]
    InvalidTypeHint {
        /// The text that failed to parse
        input: String,
        /// Reason for failure
        reason: String,
    },

    /// Generation settings are inconsistent
    #[error("Invalid generation config: {0}")]
    InvalidConfig(String),

    /// Strategy refused to produce a value
    #[error("Generation error: {0}")]
    Generation(String),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingSignature("add".to_string());
        assert_eq!(err.to_string(), "No signature available for add");
    }

    #[test]
    fn test_missing_strategy_names_param() {
        let err = Error::MissingStrategy {
            param: "x".to_string(),
        };
        assert!(err.to_string().contains("`x`"));
    }

    #[test]
    fn test_too_many_positional() {
        let err = Error::TooManyPositional {
            given: 3,
            accepted: 2,
        };
        assert_eq!(
            err.to_string(),
            "Got 3 positional overrides but only 2 positional parameters"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn test_error_from_serde_yaml() {
        let yaml_err: serde_yaml::Error = serde_yaml::from_str::<i32>("not: [yaml").unwrap_err();
        let err: Error = yaml_err.into();
        assert!(matches!(err, Error::YamlError(_)));
        assert!(err.to_string().contains("YAML error"));
    }
}

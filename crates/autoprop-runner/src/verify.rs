//! Verification wrapper
//!
//! Wraps a target so every call follows the same sequence: invoke, suppress
//! allowed errors, check the declared return type, then run the verifier.
//! Suppression happens before any check, so a suppressed call never reaches
//! the return-type check or the verifier.

use crate::error::{Error, Result};
use crate::scenario::Scenario;
use autoprop_gen::{ArgumentBundle, Introspect, Raised, TargetFn, TypeHint, validate};
use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Custom check run against every successful invocation
pub type Verifier = Arc<dyn Fn(&Scenario<'_>) -> std::result::Result<(), Raised> + Send + Sync>;

/// Failure reported by [`ensure`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct VerificationFailed(pub String);

/// Fail verification with `message` unless `condition` holds
///
/// # Errors
///
/// Returns `VerificationFailed` when `condition` is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> std::result::Result<(), Raised> {
    if condition {
        Ok(())
    } else {
        Err(Box::new(VerificationFailed(message.into())))
    }
}

#[derive(Clone, Copy)]
struct ErrorMatcher {
    type_name: &'static str,
    matches: fn(&(dyn StdError + 'static)) -> bool,
}

/// Error types that count as acceptable outcomes
///
/// Matching is by exact concrete type of the raised error.
#[derive(Clone, Default)]
pub struct AllowedErrors {
    matchers: Vec<ErrorMatcher>,
}

impl AllowedErrors {
    /// Empty allow-list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow errors of type `E`
    #[must_use]
    pub fn allow<E: StdError + 'static>(mut self) -> Self {
        let type_name = std::any::type_name::<E>();
        if !self.matchers.iter().any(|m| m.type_name == type_name) {
            self.matchers.push(ErrorMatcher {
                type_name,
                matches: |err| err.is::<E>(),
            });
        }
        self
    }

    /// Type name of the allowed type `err` belongs to
    #[must_use]
    pub fn matching(&self, err: &(dyn StdError + 'static)) -> Option<&'static str> {
        self.matchers
            .iter()
            .find(|m| (m.matches)(err))
            .map(|m| m.type_name)
    }

    /// Whether nothing is allowed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Allowed type names, in insertion order
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.matchers.iter().map(|m| m.type_name)
    }
}

impl std::fmt::Debug for AllowedErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.type_names()).finish()
    }
}

/// Result of one wrapped invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Invocation {
    /// Target returned and passed all checks
    Returned(Value),
    /// Target raised an allowed error
    Suppressed {
        /// Allowed type that matched
        error_type: &'static str,
        /// Rendered error
        message: String,
    },
}

impl Invocation {
    /// Returned value, if the call was not suppressed
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Returned(value) => Some(value),
            Self::Suppressed { .. } => None,
        }
    }

    /// Whether an allowed error was suppressed
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed { .. })
    }
}

/// A target wrapped with allow-list, return check and verifier
#[derive(Clone)]
pub struct VerifiedCallable {
    target: TargetFn,
    allowed: AllowedErrors,
    returns: Option<TypeHint>,
    verifier: Option<Verifier>,
}

impl std::fmt::Debug for VerifiedCallable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifiedCallable")
            .field("target", &self.target.name())
            .field("allowed", &self.allowed)
            .field("returns", &self.returns)
            .field("verifier", &self.verifier.is_some())
            .finish()
    }
}

impl VerifiedCallable {
    /// Wrap `target`, checking its declared return type if any
    #[must_use]
    pub fn new(target: TargetFn) -> Self {
        let returns = target.signature().and_then(|s| s.returns().cloned());
        Self {
            target,
            allowed: AllowedErrors::new(),
            returns,
            verifier: None,
        }
    }

    /// Set the allowed error types
    #[must_use]
    pub fn with_allowed(mut self, allowed: AllowedErrors) -> Self {
        self.allowed = allowed;
        self
    }

    /// Set the verifier
    #[must_use]
    pub fn with_verifier(mut self, verifier: Option<Verifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// The wrapped target
    #[must_use]
    pub const fn target(&self) -> &TargetFn {
        &self.target
    }

    /// Declared return type being enforced
    #[must_use]
    pub const fn returns(&self) -> Option<&TypeHint> {
        self.returns.as_ref()
    }

    /// Allowed error types
    #[must_use]
    pub const fn allowed(&self) -> &AllowedErrors {
        &self.allowed
    }

    /// Invoke the target once with `bundle`
    ///
    /// # Errors
    ///
    /// `Error::Unexpected` when the target raises a disallowed error,
    /// `Error::ReturnContract` when the result does not conform, and
    /// `Error::Verification` when the verifier fails.
    pub fn invoke(&self, bundle: &ArgumentBundle) -> Result<Invocation> {
        let name = self.target.name();
        let result = match self.target.call(bundle) {
            Ok(result) => result,
            Err(err) => {
                if let Some(error_type) = self.allowed.matching(err.as_ref()) {
                    debug!(function = name, error_type, error = %err, "suppressed allowed error");
                    return Ok(Invocation::Suppressed {
                        error_type,
                        message: err.to_string(),
                    });
                }
                return Err(Error::Unexpected {
                    target: name.to_string(),
                    source: err,
                });
            }
        };

        if let Some(hint) = &self.returns {
            if let Err(source) = validate(hint, &result) {
                return Err(Error::ReturnContract {
                    target: name.to_string(),
                    result,
                    source,
                });
            }
        }

        if let Some(verifier) = &self.verifier {
            let scenario = Scenario {
                args: bundle.args(),
                kwargs: bundle.kwargs(),
                result: &result,
                target: &self.target,
            };
            verifier(&scenario).map_err(|source| {
                debug!(function = name, scenario = ?scenario.to_record(), "verifier rejected scenario");
                Error::Verification {
                    target: name.to_string(),
                    source,
                }
            })?;
        }

        trace!(function = name, %result, "invocation passed");
        Ok(Invocation::Returned(result))
    }
}

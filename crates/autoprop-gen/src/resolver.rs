//! Strategy resolution
//!
//! Chooses one strategy per parameter and composes them into a joint
//! strategy whose samples are argument bundles. Priority per parameter:
//! explicit strategy override, literal override, declared type, declared
//! default. A parameter with none of these is a configuration error.

use crate::bundle::{ArgumentBundle, Kwargs};
use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::signature::{ParamKind, Signature};
use crate::strategies::{ValueStrategy, constant_generator, derive_generator};
use proptest::prelude::*;
use serde_json::Value;
use tracing::debug;

/// Caller-supplied replacement for a parameter's derived strategy
pub enum Override {
    /// Strategy used verbatim
    Strategy(ValueStrategy),
    /// Literal repeated for every sample
    Literal(Value),
}

impl Override {
    /// Wrap any proptest strategy whose values convert into `Value`
    #[must_use]
    pub fn strategy<S>(strategy: S) -> Self
    where
        S: Strategy + 'static,
        S::Value: Into<Value>,
    {
        Self::Strategy(strategy.prop_map(Into::<Value>::into).boxed())
    }

    /// Use a fixed value
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }
}

impl std::fmt::Debug for Override {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strategy(_) => f.write_str("Strategy(..)"),
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
        }
    }
}

impl From<Value> for Override {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<ValueStrategy> for Override {
    fn from(strategy: ValueStrategy) -> Self {
        Self::Strategy(strategy)
    }
}

/// Positional and named overrides for one target
#[derive(Debug, Default)]
pub struct Overrides {
    positional: Vec<Override>,
    named: Vec<(String, Override)>,
}

impl Overrides {
    /// No overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional override
    #[must_use]
    pub fn arg(mut self, value: impl Into<Override>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add or replace a named override
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Override>) -> Self {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.named.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.named.push((name, value));
        }
        self
    }

    /// Whether no override was supplied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Caller strategy
    Strategy,
    /// Caller literal
    Literal,
    /// Derived from the declared type
    Derived,
    /// Declared default of an untyped parameter
    Default,
}

/// Strategy chosen for one parameter
#[derive(Debug)]
pub struct ResolvedParam {
    /// Parameter name
    pub name: String,
    /// Whether the value is passed positionally
    pub positional: bool,
    /// Where the strategy came from
    pub source: Source,
    strategy: ValueStrategy,
}

/// All per-parameter strategies of one target, in signature order
#[derive(Debug)]
pub struct JointStrategy {
    params: Vec<ResolvedParam>,
}

impl JointStrategy {
    /// Resolved parameters in signature order
    #[must_use]
    pub fn params(&self) -> &[ResolvedParam] {
        &self.params
    }

    /// Compose into one strategy producing bundles
    #[must_use]
    pub fn into_strategy(self) -> BoxedStrategy<ArgumentBundle> {
        let split = self.params.iter().take_while(|p| p.positional).count();
        let names: Vec<String> = self.params.iter().map(|p| p.name.clone()).collect();
        let strategies: Vec<ValueStrategy> = self.params.into_iter().map(|p| p.strategy).collect();

        strategies
            .prop_map(move |mut values| {
                let named = values.split_off(split);
                let kwargs: Kwargs = names[split..].iter().cloned().zip(named).collect();
                ArgumentBundle::new(values, kwargs)
            })
            .boxed()
    }
}

/// Resolve one strategy per parameter of `signature`
///
/// # Errors
///
/// Returns a configuration error for unknown, duplicate or excess overrides,
/// or when a parameter has nothing to generate from.
pub fn resolve(
    signature: &Signature,
    overrides: Overrides,
    config: &GenerationConfig,
) -> Result<JointStrategy> {
    let params = signature.params();
    let accepted = params
        .iter()
        .take_while(|p| p.kind.accepts_positional())
        .count();
    if overrides.positional.len() > accepted {
        return Err(Error::TooManyPositional {
            given: overrides.positional.len(),
            accepted,
        });
    }
    for (name, _) in &overrides.named {
        match signature.position(name) {
            None => return Err(Error::UnknownParameter(name.clone())),
            Some(i) if i < overrides.positional.len() => {
                return Err(Error::DuplicateOverride(name.clone()));
            }
            Some(_) => {}
        }
    }

    let covered = overrides.positional.len();
    let mut positional = overrides.positional.into_iter();
    let mut named = overrides.named;

    let mut resolved = Vec::with_capacity(params.len());
    for (i, param) in params.iter().enumerate() {
        let supplied = if i < covered {
            positional.next()
        } else {
            named
                .iter()
                .position(|(n, _)| *n == param.name)
                .map(|at| named.swap_remove(at).1)
        };

        let (source, strategy) = match (supplied, &param.hint, &param.default) {
            (Some(Override::Strategy(s)), _, _) => (Source::Strategy, s),
            (Some(Override::Literal(v)), _, _) => (Source::Literal, constant_generator(v)),
            (None, Some(hint), _) => (Source::Derived, derive_generator(hint, config)?),
            (None, None, Some(default)) => (Source::Default, constant_generator(default.clone())),
            (None, None, None) => {
                return Err(Error::MissingStrategy {
                    param: param.name.clone(),
                });
            }
        };

        let is_positional = i < covered || param.kind == ParamKind::PositionalOnly;
        debug!(param = %param.name, ?source, positional = is_positional, "resolved parameter strategy");
        resolved.push(ResolvedParam {
            name: param.name.clone(),
            positional: is_positional,
            source,
            strategy,
        });
    }

    Ok(JointStrategy { params: resolved })
}

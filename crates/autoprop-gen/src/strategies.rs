//! Value generation backed by proptest
//!
//! Three capabilities are exposed to the rest of the pipeline: derive a
//! strategy from a type hint, wrap a literal into a constant strategy, and
//! draw one sample from a strategy.

use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::hint::TypeHint;
use proptest::prelude::*;
use proptest::strategy::{Union, ValueTree};
use proptest::string::{RegexGeneratorStrategy, string_regex};
use proptest::test_runner::{Config, RngAlgorithm, TestRng, TestRunner};
use serde_json::{Map, Value};

/// Type-erased strategy producing dynamic values
pub type ValueStrategy = BoxedStrategy<Value>;

/// Pattern for generated `dict` keys
const DICT_KEY_PATTERN: &str = "[a-z][a-z0-9_]{0,7}";

/// Derive a strategy for values of `hint`
///
/// # Errors
///
/// Returns an error if the configured string pattern is not a valid regex.
pub fn derive_generator(hint: &TypeHint, config: &GenerationConfig) -> Result<ValueStrategy> {
    let strategy = match hint {
        TypeHint::Any => {
            let scalars = [
                TypeHint::None,
                TypeHint::Bool,
                TypeHint::Int,
                TypeHint::Float,
                TypeHint::Str,
            ];
            let options = scalars
                .iter()
                .map(|h| derive_generator(h, config))
                .collect::<Result<Vec<_>>>()?;
            Union::new(options).boxed()
        }
        TypeHint::None => Just(Value::Null).boxed(),
        TypeHint::Bool => any::<bool>().prop_map(Value::from).boxed(),
        TypeHint::Int => (config.int_min..=config.int_max)
            .prop_map(Value::from)
            .boxed(),
        TypeHint::IntRange { min, max } => {
            let (lo, hi) = clamp_range(*min, *max, config)?;
            (lo..=hi).prop_map(Value::from).boxed()
        }
        TypeHint::Float => (config.float_min..=config.float_max)
            .prop_map(Value::from)
            .boxed(),
        TypeHint::Str => string_strategy(&config.string_pattern)?,
        TypeHint::List(inner) => {
            prop::collection::vec(derive_generator(inner, config)?, 0..=config.max_collection_len)
                .prop_map(Value::Array)
                .boxed()
        }
        TypeHint::Dict(inner) => prop::collection::btree_map(
            regex(DICT_KEY_PATTERN)?,
            derive_generator(inner, config)?,
            0..=config.max_collection_len,
        )
        .prop_map(|map| Value::Object(map.into_iter().collect::<Map<String, Value>>()))
        .boxed(),
        TypeHint::Tuple(items) => items
            .iter()
            .map(|h| derive_generator(h, config))
            .collect::<Result<Vec<_>>>()?
            .prop_map(Value::Array)
            .boxed(),
        TypeHint::Optional(inner) => prop_oneof![
            1 => Just(Value::Null),
            3 => derive_generator(inner, config)?,
        ]
        .boxed(),
        TypeHint::Union(items) => {
            if items.is_empty() {
                return Err(Error::Generation("cannot sample an empty Union".to_string()));
            }
            let options = items
                .iter()
                .map(|h| derive_generator(h, config))
                .collect::<Result<Vec<_>>>()?;
            Union::new(options).boxed()
        }
    };
    Ok(strategy)
}

/// Intersection of a declared integer range with the configured one
fn clamp_range(min: i128, max: i128, config: &GenerationConfig) -> Result<(i64, i64)> {
    let lo = min.max(i128::from(config.int_min));
    let hi = max.min(i128::from(config.int_max));
    match (i64::try_from(lo), i64::try_from(hi)) {
        (Ok(lo), Ok(hi)) if lo <= hi => Ok((lo, hi)),
        _ => Err(Error::InvalidConfig(format!(
            "int range [{min}, {max}] does not overlap configured [{}, {}]",
            config.int_min, config.int_max
        ))),
    }
}

fn regex(pattern: &str) -> Result<RegexGeneratorStrategy<String>> {
    string_regex(pattern)
        .map_err(|e| Error::InvalidConfig(format!("string pattern `{pattern}`: {e}")))
}

fn string_strategy(pattern: &str) -> Result<ValueStrategy> {
    Ok(regex(pattern)?.prop_map(Value::String).boxed())
}

/// Strategy that always yields `value`
#[must_use]
pub fn constant_generator(value: Value) -> ValueStrategy {
    Just(value).boxed()
}

/// Draws fresh samples from strategies
pub struct Sampler {
    runner: TestRunner,
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler").finish_non_exhaustive()
    }
}

impl Sampler {
    /// Create a sampler, seeded when `config.seed` is set
    #[must_use]
    pub fn new(config: &GenerationConfig) -> Self {
        let runner = match config.seed {
            Some(seed) => {
                let mut bytes = [0u8; 32];
                bytes[..8].copy_from_slice(&seed.to_le_bytes());
                TestRunner::new_with_rng(
                    Config::default(),
                    TestRng::from_seed(RngAlgorithm::ChaCha, &bytes),
                )
            }
            None => TestRunner::new(Config::default()),
        };
        Self { runner }
    }

    /// Draw one value
    ///
    /// # Errors
    ///
    /// Returns `Error::Generation` when the strategy rejects every attempt.
    pub fn sample<S: Strategy>(&mut self, strategy: &S) -> Result<S::Value> {
        strategy
            .new_tree(&mut self.runner)
            .map(|tree| tree.current())
            .map_err(|reason| Error::Generation(reason.to_string()))
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(&GenerationConfig::default())
    }
}

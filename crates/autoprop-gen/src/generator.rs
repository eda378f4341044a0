//! Parameter generation
//!
//! Samples a joint strategy a fixed number of times. Each slot is an
//! independent draw; with a seeded config the sequence is reproducible.

use crate::bundle::ArgumentBundle;
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::resolver::{JointStrategy, Overrides, resolve};
use crate::signature::{Introspect, introspect};
use crate::strategies::Sampler;
use proptest::strategy::BoxedStrategy;
use tracing::debug;

/// Number of argument bundles drawn when no limit is given
pub const DEFAULT_LIMIT: usize = 50;

/// Draws argument bundles from a joint strategy
#[derive(Debug)]
pub struct ParameterGenerator {
    strategy: BoxedStrategy<ArgumentBundle>,
    sampler: Sampler,
}

impl ParameterGenerator {
    /// Create a generator over a resolved joint strategy
    #[must_use]
    pub fn new(joint: JointStrategy, config: &GenerationConfig) -> Self {
        Self {
            strategy: joint.into_strategy(),
            sampler: Sampler::new(config),
        }
    }

    /// Resolve `target`'s parameters and build a generator
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the target has no signature or a
    /// parameter cannot be resolved.
    pub fn for_target<T: Introspect + ?Sized>(
        target: &T,
        overrides: Overrides,
        config: &GenerationConfig,
    ) -> Result<Self> {
        config.validate()?;
        let signature = introspect(target)?;
        let joint = resolve(signature, overrides, config)?;
        Ok(Self::new(joint, config))
    }

    /// Draw one bundle
    ///
    /// # Errors
    ///
    /// Returns `Error::Generation` when the strategies reject every attempt.
    pub fn next_bundle(&mut self) -> Result<ArgumentBundle> {
        self.sampler.sample(&self.strategy)
    }

    /// Draw exactly `limit` bundles
    ///
    /// # Errors
    ///
    /// Returns the first generation failure.
    pub fn generate(&mut self, limit: usize) -> Result<Vec<ArgumentBundle>> {
        let bundles = (0..limit)
            .map(|_| self.next_bundle())
            .collect::<Result<Vec<_>>>()?;
        debug!(count = bundles.len(), "generated argument bundles");
        Ok(bundles)
    }
}

/// Generate `limit` argument bundles for `target`
///
/// # Errors
///
/// Returns a configuration or generation error; nothing is invoked.
pub fn auto_parameters<T: Introspect + ?Sized>(
    target: &T,
    overrides: Overrides,
    limit: usize,
    config: &GenerationConfig,
) -> Result<Vec<ArgumentBundle>> {
    ParameterGenerator::for_target(target, overrides, config)?.generate(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::hint::TypeHint;
    use crate::resolver::Override;
    use crate::signature::Signature;
    use crate::target::TargetFn;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    fn add() -> TargetFn {
        TargetFn::typed2("add", ["a", "b"], |a: i64, b: i64| a + b).unwrap()
    }

    #[test]
    fn test_default_limit() {
        let bundles = auto_parameters(&add(), Overrides::new(), DEFAULT_LIMIT, &GenerationConfig::default()).unwrap();
        assert_eq!(bundles.len(), 50);
    }

    #[test]
    fn test_zero_limit() {
        let bundles = auto_parameters(&add(), Overrides::new(), 0, &GenerationConfig::default()).unwrap();
        assert!(bundles.is_empty());
    }

    #[test]
    fn test_shape_matches_signature() {
        let target = add();
        let signature = introspect(&target).unwrap().clone();
        for bundle in auto_parameters(&target, Overrides::new(), 25, &GenerationConfig::default()).unwrap() {
            let bound = bundle.bind(&signature).unwrap();
            assert_eq!(bound.len(), 2);
            assert!(bound.iter().all(|v| v.is_i64()));
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = GenerationConfig::default().with_seed(1234);
        let first = auto_parameters(&add(), Overrides::new(), 10, &config).unwrap();
        let second = auto_parameters(&add(), Overrides::new(), 10, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_signature() {
        let target = TargetFn::opaque("mystery", |_| Ok(Value::Null));
        let err = auto_parameters(&target, Overrides::new(), 5, &GenerationConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingSignature(name) if name == "mystery"));
    }

    #[test]
    fn test_invalid_config_rejected_before_sampling() {
        let config = GenerationConfig::default().with_int_range(10, 0);
        let err = auto_parameters(&add(), Overrides::new(), 5, &config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_unsatisfiable_override_is_generation_error() {
        let overrides = Overrides::new().kwarg(
            "a",
            Override::strategy((0i64..10).prop_filter("impossible", |_| false)),
        );
        let mut generator = ParameterGenerator::for_target(&add(), overrides, &GenerationConfig::default()).unwrap();
        assert!(matches!(generator.generate(3), Err(Error::Generation(_))));
    }

    #[test]
    fn test_untyped_target_requires_override() {
        let signature = Signature::builder().untyped("x").returns(TypeHint::Any).build().unwrap();
        let target = TargetFn::new("echo", signature, |bundle| Ok(bundle.kwargs().get("x").cloned().unwrap_or(Value::Null)));
        assert!(matches!(
            auto_parameters(&target, Overrides::new(), 1, &GenerationConfig::default()),
            Err(Error::MissingStrategy { .. })
        ));
        let bundles = auto_parameters(
            &target,
            Overrides::new().kwarg("x", Override::literal(json!([1, 2]))),
            3,
            &GenerationConfig::default(),
        )
        .unwrap();
        assert!(bundles.iter().all(|b| b.kwargs().get("x") == Some(&json!([1, 2]))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_exact_count(limit in 0usize..80) {
            let bundles = auto_parameters(&add(), Overrides::new(), limit, &GenerationConfig::default()).unwrap();
            prop_assert_eq!(bundles.len(), limit);
        }

        #[test]
        fn prop_literal_everywhere(literal in any::<i32>(), limit in 1usize..30) {
            let overrides = Overrides::new().arg(Value::from(literal));
            let bundles = auto_parameters(&add(), overrides, limit, &GenerationConfig::default()).unwrap();
            for bundle in bundles {
                prop_assert_eq!(bundle.args(), &[Value::from(literal)][..]);
            }
        }
    }
}

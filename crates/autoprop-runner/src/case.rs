//! Deferred test cases
//!
//! A test case binds one argument bundle to a shared verified callable.
//! Constructing cases never invokes the target.

use crate::error::Result;
use crate::options::AutoOptions;
use crate::verify::{Invocation, VerifiedCallable};
use autoprop_gen::{ArgumentBundle, ParameterGenerator, TargetFn};
use std::sync::Arc;
use tracing::debug;

/// One generated, independently runnable case
#[derive(Debug, Clone)]
pub struct TestCase {
    index: usize,
    bundle: ArgumentBundle,
    callable: Arc<VerifiedCallable>,
}

impl TestCase {
    /// Position within the generated sequence
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Stable name for test-runner registration
    #[must_use]
    pub fn name(&self) -> String {
        format!("test_auto_{}_{}", self.callable.target().name(), self.index)
    }

    /// Bound arguments
    #[must_use]
    pub const fn bundle(&self) -> &ArgumentBundle {
        &self.bundle
    }

    /// Verified callable shared by all cases of one target
    #[must_use]
    pub fn callable(&self) -> &VerifiedCallable {
        &self.callable
    }

    /// Invoke the target once with the bound arguments
    ///
    /// # Errors
    ///
    /// Returns the verification wrapper's failure unchanged.
    pub fn run(&self) -> Result<Invocation> {
        self.callable.invoke(&self.bundle)
    }
}

/// Builds test cases over one verified callable
#[derive(Debug, Clone)]
pub struct TestCaseFactory {
    callable: Arc<VerifiedCallable>,
}

impl TestCaseFactory {
    /// Factory for `callable`
    #[must_use]
    pub fn new(callable: VerifiedCallable) -> Self {
        Self {
            callable: Arc::new(callable),
        }
    }

    /// One case per bundle, in order
    #[must_use]
    pub fn build(&self, bundles: Vec<ArgumentBundle>) -> Vec<TestCase> {
        bundles
            .into_iter()
            .enumerate()
            .map(|(index, bundle)| TestCase {
                index,
                bundle,
                callable: Arc::clone(&self.callable),
            })
            .collect()
    }
}

/// Generate the test cases for `target` without running any of them
///
/// # Errors
///
/// Returns `Error::Config` when parameters cannot be resolved or sampled.
pub fn auto_test_cases(target: &TargetFn, options: AutoOptions) -> Result<Vec<TestCase>> {
    let AutoOptions {
        overrides,
        allowed,
        verifier,
        runs,
        generation,
    } = options;
    let bundles = ParameterGenerator::for_target(target, overrides, &generation)?.generate(runs)?;
    let callable = VerifiedCallable::new(target.clone())
        .with_allowed(allowed)
        .with_verifier(verifier);
    let cases = TestCaseFactory::new(callable).build(bundles);
    debug!(function = target.name(), count = cases.len(), "built test cases");
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_target(calls: Arc<AtomicUsize>) -> TargetFn {
        TargetFn::typed2("add", ["a", "b"], move |a: i64, b: i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            a + b
        })
        .unwrap()
    }

    #[test]
    fn test_construction_is_deferred() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cases = auto_test_cases(&counting_target(Arc::clone(&calls)), AutoOptions::new().runs(10)).unwrap();
        assert_eq!(cases.len(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        cases[3].run().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_names_and_indices() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cases = auto_test_cases(&counting_target(calls), AutoOptions::new().runs(3)).unwrap();
        let names: Vec<String> = cases.iter().map(TestCase::name).collect();
        assert_eq!(names, ["test_auto_add_0", "test_auto_add_1", "test_auto_add_2"]);
        assert!(cases.iter().enumerate().all(|(i, c)| c.index() == i));
    }

    #[test]
    fn test_cases_share_callable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cases = auto_test_cases(&counting_target(calls), AutoOptions::new().runs(2)).unwrap();
        assert!(std::ptr::eq(cases[0].callable(), cases[1].callable()));
    }

    #[test]
    fn test_run_is_repeatable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cases = auto_test_cases(
            &counting_target(Arc::clone(&calls)),
            AutoOptions::new().arg(json!(2)).arg(json!(3)).runs(1),
        )
        .unwrap();
        let first = cases[0].run().unwrap();
        let second = cases[0].run().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.value(), Some(&json!(5)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cases = auto_test_cases(&counting_target(calls), AutoOptions::new().runs(0)).unwrap();
        assert!(cases.is_empty());
    }

    #[test]
    fn test_configuration_error_before_any_case() {
        let target = TargetFn::opaque("mystery", |_| Ok(json!(null)));
        let err = auto_test_cases(&target, AutoOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Config(autoprop_gen::Error::MissingSignature(_))));
    }
}

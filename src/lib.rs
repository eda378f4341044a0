//! autoprop
//!
//! Property-based testing driven by declared signatures. Describe a target's
//! parameters (or build it from a typed closure), and autoprop draws a
//! bounded, reproducible sequence of argument bundles, calls the target with
//! each, and checks the result against the declared return type and any
//! custom verifier.
//!
//! ```
//! use autoprop::prelude::*;
//!
//! let add = TargetFn::typed2("add", ["a", "b"], |a: i64, b: i64| a + b).unwrap();
//! let summary = auto_test(&add, AutoOptions::new().runs(10)).unwrap();
//! assert_eq!(summary.executed, 10);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use autoprop_gen as gen_core;
pub use autoprop_runner as runner;

pub use autoprop_gen::{
    ArgumentBundle, GenerationConfig, HasTypeHint, Kwargs, Override, Overrides, Param, ParamKind,
    Signature, TargetFn, TypeHint, auto_parameters,
};
pub use autoprop_runner::{
    AllowedErrors, AutoOptions, Error, Module, Result, RunSummary, Scenario, SuiteConfig,
    SuiteRunner, TestCase, auto_test, auto_test_cases, auto_test_module, ensure,
};

/// Common imports
pub mod prelude {
    pub use autoprop_gen::{
        ArgumentBundle, GenerationConfig, Override, Overrides, Raised, Signature, TargetFn,
        TypeHint, auto_parameters,
    };
    pub use autoprop_runner::{
        AutoOptions, Export, Invocation, Module, Outcome, Scenario, SuiteConfig, SuiteRunner,
        auto_test, auto_test_cases, auto_test_module, ensure,
    };
}

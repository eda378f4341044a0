//! autoprop runner
//!
//! Wraps targets with error allow-listing, return-type checks and custom
//! verifiers, packages generated bundles as deferred test cases, and runs
//! them either immediately (`auto_test`, `auto_test_module`) or on a
//! parallel suite runner with per-case isolation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_closure_for_method_calls))]
#![cfg_attr(test, allow(clippy::uninlined_format_args))]

pub mod case;
pub mod config;
pub mod driver;
pub mod error;
pub mod module;
pub mod options;
pub mod scenario;
pub mod suite;
pub mod verify;

pub use case::{TestCase, TestCaseFactory, auto_test_cases};
pub use config::SuiteConfig;
pub use driver::{RunSummary, auto_test};
pub use error::{Error, FailureCategory, Result};
pub use module::{Export, Module, ModuleSummary, PRIVATE_PREFIX, auto_test_module};
pub use options::AutoOptions;
pub use scenario::{Scenario, ScenarioRecord};
pub use suite::{CaseReport, Outcome, SuiteReport, SuiteRunner};
pub use verify::{AllowedErrors, Invocation, VerificationFailed, VerifiedCallable, Verifier, ensure};

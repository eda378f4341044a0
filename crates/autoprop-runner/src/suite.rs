//! Parallel suite execution using Rayon
//!
//! Runs generated cases on a dedicated worker pool. Each case is isolated:
//! errors and panics become case outcomes instead of propagating. With
//! stop-on-failure set, cases not yet started after a failure are skipped.

#![allow(clippy::cast_possible_truncation)]

use crate::case::{TestCase, auto_test_cases};
use crate::config::SuiteConfig;
use crate::error::{Error, FailureCategory, Result};
use crate::options::AutoOptions;
use crate::verify::Invocation;
use autoprop_gen::{ArgumentBundle, TargetFn};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of one case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Returned and passed every check
    Passed,
    /// Raised an allowed error
    Suppressed,
    /// Raised an error outside the allow-list
    Unexpected,
    /// Returned a value violating the declared return type
    ReturnContract,
    /// Verifier rejected the result
    Verification,
    /// Target or verifier panicked
    Panicked,
    /// Not run because the suite stopped early
    Skipped,
}

impl Outcome {
    /// Check if this outcome counts as a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Passed | Self::Suppressed)
    }

    /// Check if this outcome is a failure
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        !self.is_pass() && !matches!(self, Self::Skipped)
    }

    const fn from_category(category: FailureCategory) -> Self {
        match category {
            FailureCategory::ReturnContract => Self::ReturnContract,
            FailureCategory::Verification => Self::Verification,
            FailureCategory::Unexpected | FailureCategory::Configuration => Self::Unexpected,
        }
    }
}

/// Record of one executed or skipped case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    /// Case name
    pub name: String,
    /// Target name
    pub target: String,
    /// Case index within its target
    pub index: usize,
    /// Outcome
    pub outcome: Outcome,
    /// Error, suppression or panic message
    pub message: Option<String>,
    /// Arguments the case was bound to
    pub bundle: ArgumentBundle,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Aggregate result of a suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
    /// Per-case reports, in input order
    pub cases: Vec<CaseReport>,
    /// Passed cases
    pub passed: usize,
    /// Suppressed cases
    pub suppressed: usize,
    /// Failed or panicked cases
    pub failed: usize,
    /// Skipped cases
    pub skipped: usize,
    /// Whether execution was stopped early
    pub stopped_early: bool,
}

impl SuiteReport {
    fn from_cases(started_at: DateTime<Utc>, duration_ms: u64, cases: Vec<CaseReport>, stopped_early: bool) -> Self {
        let count = |outcome: Outcome| cases.iter().filter(|c| c.outcome == outcome).count();
        let passed = count(Outcome::Passed);
        let suppressed = count(Outcome::Suppressed);
        let skipped = count(Outcome::Skipped);
        let failed = cases.iter().filter(|c| c.outcome.is_fail()).count();
        Self {
            started_at,
            duration_ms,
            cases,
            passed,
            suppressed,
            failed,
            skipped,
            stopped_early,
        }
    }

    /// Total cases, including skipped ones
    #[must_use]
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    /// Whether no case failed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Failed case reports
    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| c.outcome.is_fail())
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Returns `Error::JsonError` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs test cases on a worker pool
pub struct SuiteRunner {
    config: SuiteConfig,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for SuiteRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("config", &self.config)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl SuiteRunner {
    /// Create a runner with its own thread pool
    ///
    /// # Errors
    ///
    /// Returns an error for invalid config or if the pool cannot be built.
    pub fn new(config: SuiteConfig) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("autoprop-worker-{i}"))
            .build()?;
        Ok(Self { config, pool })
    }

    /// Runner configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Execute `cases`, isolating each one
    #[must_use]
    pub fn run(&self, cases: &[TestCase]) -> SuiteReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let stop_flag = AtomicBool::new(false);

        let reports: Vec<CaseReport> = self.pool.install(|| {
            cases
                .par_iter()
                .map(|case| {
                    if self.config.stop_on_failure && stop_flag.load(Ordering::Relaxed) {
                        return skipped(case);
                    }
                    let report = execute_single(case);
                    if report.outcome.is_fail() {
                        warn!(
                            case = %report.name,
                            outcome = ?report.outcome,
                            message = report.message.as_deref().unwrap_or_default(),
                            "case failed"
                        );
                        if self.config.stop_on_failure {
                            stop_flag.store(true, Ordering::Relaxed);
                        }
                    }
                    report
                })
                .collect()
        });

        let report = SuiteReport::from_cases(
            started_at,
            start.elapsed().as_millis() as u64,
            reports,
            stop_flag.load(Ordering::Relaxed),
        );
        info!(
            total = report.total(),
            passed = report.passed,
            suppressed = report.suppressed,
            failed = report.failed,
            skipped = report.skipped,
            duration_ms = report.duration_ms,
            "suite finished"
        );
        report
    }

    /// Generate the cases for `target` and run them
    ///
    /// `options.runs` and `options.generation` are used as given.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the cases cannot be generated.
    pub fn run_target(&self, target: &TargetFn, options: AutoOptions) -> Result<SuiteReport> {
        let cases = auto_test_cases(target, options)?;
        Ok(self.run(&cases))
    }
}

fn base_report(case: &TestCase, outcome: Outcome, message: Option<String>, duration_ms: u64) -> CaseReport {
    CaseReport {
        name: case.name(),
        target: case.callable().target().name().to_string(),
        index: case.index(),
        outcome,
        message,
        bundle: case.bundle().clone(),
        duration_ms,
    }
}

fn skipped(case: &TestCase) -> CaseReport {
    base_report(case, Outcome::Skipped, None, 0)
}

fn execute_single(case: &TestCase) -> CaseReport {
    let start = Instant::now();
    let result = catch_unwind(AssertUnwindSafe(|| case.run()));
    let duration = start.elapsed().as_millis() as u64;

    let (outcome, message) = match result {
        Ok(Ok(Invocation::Returned(_))) => (Outcome::Passed, None),
        Ok(Ok(Invocation::Suppressed { error_type, message })) => {
            (Outcome::Suppressed, Some(format!("{error_type}: {message}")))
        }
        Ok(Err(err)) => (outcome_for(&err), Some(err.to_string())),
        Err(payload) => (Outcome::Panicked, Some(panic_message(payload.as_ref()))),
    };
    base_report(case, outcome, message, duration)
}

fn outcome_for(err: &Error) -> Outcome {
    Outcome::from_category(err.category())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

//! Blocking drivers
//!
//! Generate and immediately run every case for a target, stopping at the
//! first failure.

use crate::case::auto_test_cases;
use crate::error::Result;
use crate::options::AutoOptions;
use autoprop_gen::TargetFn;
use serde::Serialize;
use tracing::info;

/// Counts from one completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    /// Cases invoked
    pub executed: usize,
    /// Cases whose error was on the allow-list
    pub suppressed: usize,
}

impl RunSummary {
    /// Cases that returned and passed every check
    #[must_use]
    pub const fn passed(&self) -> usize {
        self.executed - self.suppressed
    }
}

/// Run the full pipeline against `target`
///
/// # Errors
///
/// Returns the configuration error, or the first case failure exactly as
/// the verification wrapper reported it.
pub fn auto_test(target: &TargetFn, options: AutoOptions) -> Result<RunSummary> {
    let cases = auto_test_cases(target, options)?;
    let mut summary = RunSummary::default();
    for case in &cases {
        let outcome = case.run()?;
        summary.executed += 1;
        if outcome.is_suppressed() {
            summary.suppressed += 1;
        }
    }
    info!(
        function = target.name(),
        executed = summary.executed,
        suppressed = summary.suppressed,
        "auto test passed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, FailureCategory};
    use crate::verify::ensure;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("negative input")]
    struct Negative;

    #[test]
    fn test_runs_every_case() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let target = TargetFn::typed1("square", ["x"], move |x: i32| {
            counter.fetch_add(1, Ordering::SeqCst);
            i64::from(x) * i64::from(x)
        })
        .unwrap();
        let summary = auto_test(&target, AutoOptions::new().runs(20)).unwrap();
        assert_eq!(summary, RunSummary { executed: 20, suppressed: 0 });
        assert_eq!(summary.passed(), 20);
        assert_eq!(calls.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_counts_suppressed() {
        let target = TargetFn::try_typed1("checked", ["x"], |x: i64| {
            if x < 0 { Err(Negative) } else { Ok(x) }
        })
        .unwrap();
        let summary = auto_test(&target, AutoOptions::new().arg(json!(-1)).allow::<Negative>().runs(4)).unwrap();
        assert_eq!(summary.executed, 4);
        assert_eq!(summary.suppressed, 4);
        assert_eq!(summary.passed(), 0);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let target = TargetFn::typed1("ident", ["x"], move |x: i64| {
            counter.fetch_add(1, Ordering::SeqCst);
            x
        })
        .unwrap();
        let options = AutoOptions::new()
            .runs(10)
            .verify(|scenario| ensure(false, format!("rejected {}", scenario.result)));
        let err = auto_test(&target, options).unwrap_err();
        assert_eq!(err.category(), FailureCategory::Verification);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unexpected_error_is_returned() {
        let target = TargetFn::try_typed1("checked", ["x"], |x: i64| {
            if x < 0 { Err(Negative) } else { Ok(x) }
        })
        .unwrap();
        let err = auto_test(&target, AutoOptions::new().arg(json!(-5))).unwrap_err();
        assert!(matches!(err, Error::Unexpected { ref target, .. } if target == "checked"));
        assert!(err.raised().unwrap().is::<Negative>());
    }
}

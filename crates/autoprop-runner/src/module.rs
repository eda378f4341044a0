//! Namespace driver
//!
//! A `Module` is an explicit registration list standing in for a namespace
//! of named items. `auto_test_module` selects the public function exports
//! and runs the default pipeline against each, in registration order.

use crate::driver::{RunSummary, auto_test};
use crate::error::Result;
use crate::options::AutoOptions;
use autoprop_gen::TargetFn;
use serde_json::Value;
use tracing::{debug, info};

/// Prefix marking a name as private
pub const PRIVATE_PREFIX: char = '_';

/// One named item in a module
#[derive(Debug, Clone)]
pub enum Export {
    /// A plain function
    Function(TargetFn),
    /// Any non-function item (constants, re-exported data)
    Value(Value),
}

/// Named exports in registration order
#[derive(Debug, Clone, Default)]
pub struct Module {
    name: String,
    exports: Vec<(String, Export)>,
}

impl Module {
    /// Empty module
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exports: Vec::new(),
        }
    }

    /// Register a function under its own name
    #[must_use]
    pub fn function(self, target: TargetFn) -> Self {
        let name = target.name().to_string();
        self.export(name, Export::Function(target))
    }

    /// Register a non-function item
    #[must_use]
    pub fn value(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.export(name, Export::Value(value.into()))
    }

    /// Register any export under `name`
    #[must_use]
    pub fn export(mut self, name: impl Into<String>, export: Export) -> Self {
        self.exports.push((name.into(), export));
        self
    }

    /// Module name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All exports, in registration order
    pub fn exports(&self) -> impl Iterator<Item = (&str, &Export)> {
        self.exports.iter().map(|(name, export)| (name.as_str(), export))
    }

    /// Public function exports, in registration order
    pub fn public_functions(&self) -> impl Iterator<Item = (&str, &TargetFn)> {
        self.exports().filter_map(|(name, export)| match export {
            Export::Function(target) if !name.starts_with(PRIVATE_PREFIX) => Some((name, target)),
            _ => None,
        })
    }
}

/// Per-function results of a module run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSummary {
    /// Functions tested, with their run summaries
    pub functions: Vec<(String, RunSummary)>,
}

impl ModuleSummary {
    /// Total cases executed across all functions
    #[must_use]
    pub fn executed(&self) -> usize {
        self.functions.iter().map(|(_, s)| s.executed).sum()
    }

    /// Names of the tested functions
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|(name, _)| name.as_str())
    }
}

/// Run the default pipeline against every public function in `module`
///
/// # Errors
///
/// Returns the first failure encountered; later functions are not run.
pub fn auto_test_module(module: &Module) -> Result<ModuleSummary> {
    let mut summary = ModuleSummary::default();
    for (name, target) in module.public_functions() {
        debug!(module = module.name(), function = name, "testing export");
        let run = auto_test(target, AutoOptions::new())?;
        summary.functions.push((name.to_string(), run));
    }
    info!(
        module = module.name(),
        functions = summary.functions.len(),
        executed = summary.executed(),
        "module auto test passed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn recording(name: &str, log: Arc<Mutex<Vec<String>>>) -> TargetFn {
        let label = name.to_string();
        TargetFn::typed1(name, ["x"], move |x: i64| {
            if let Ok(mut log) = log.lock() {
                if log.last() != Some(&label) {
                    log.push(label.clone());
                }
            }
            x
        })
        .unwrap()
    }

    #[test]
    fn test_selects_public_functions_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let module = Module::new("math")
            .function(recording("zeta", Arc::clone(&log)))
            .function(recording("_hidden", Arc::clone(&log)))
            .value("PI", json!(2.5))
            .function(recording("alpha", Arc::clone(&log)));

        let summary = auto_test_module(&module).unwrap();
        assert_eq!(summary.names().collect::<Vec<_>>(), ["zeta", "alpha"]);
        assert_eq!(summary.executed(), 100);
        assert_eq!(*log.lock().unwrap(), ["zeta", "alpha"]);
    }

    #[test]
    fn test_first_failure_stops_module() {
        let later = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later);
        let failing = TargetFn::new(
            "failing",
            autoprop_gen::Signature::builder().build().unwrap(),
            |_| Err("broken".into()),
        );
        let after = TargetFn::typed1("after", ["x"], move |x: i64| {
            counter.fetch_add(1, Ordering::SeqCst);
            x
        })
        .unwrap();
        let module = Module::new("m").function(failing).function(after);
        assert!(auto_test_module(&module).is_err());
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_module() {
        let summary = auto_test_module(&Module::new("empty").value("X", 1)).unwrap();
        assert!(summary.functions.is_empty());
    }

    #[test]
    fn test_export_under_alias() {
        let target = TargetFn::typed1("inner", ["x"], |x: i64| x).unwrap();
        let module = Module::new("m").export("_alias", Export::Function(target));
        assert_eq!(module.public_functions().count(), 0);
        assert_eq!(module.exports().count(), 1);
    }
}

//! Completed invocations handed to verifiers

use autoprop_gen::{Introspect, Kwargs, TargetFn};
use serde::Serialize;
use serde_json::Value;

/// Inputs and output of one successful invocation
#[derive(Debug, Clone, Copy)]
pub struct Scenario<'a> {
    /// Positional values used
    pub args: &'a [Value],
    /// Named values used
    pub kwargs: &'a Kwargs,
    /// Value returned by the target
    pub result: &'a Value,
    /// The target that was called
    pub target: &'a TargetFn,
}

impl<'a> Scenario<'a> {
    /// Value passed for parameter `name`, positional or named
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&'a Value> {
        let index = self.target.signature().and_then(|s| s.position(name));
        index
            .and_then(|i| self.args.get(i))
            .or_else(|| self.kwargs.get(name))
    }

    /// Integer value passed for `name`
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(Value::as_i64)
    }

    /// Owned copy for logging
    #[must_use]
    pub fn to_record(&self) -> ScenarioRecord {
        ScenarioRecord {
            target: self.target.name().to_string(),
            args: self.args.to_vec(),
            kwargs: self.kwargs.clone(),
            result: self.result.clone(),
        }
    }
}

/// Owned, serializable form of a [`Scenario`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioRecord {
    /// Target name
    pub target: String,
    /// Positional values used
    pub args: Vec<Value>,
    /// Named values used
    pub kwargs: Kwargs,
    /// Value returned by the target
    pub result: Value,
}

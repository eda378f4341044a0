//! Type conformance checks
//!
//! `validate` answers "does this value conform to this hint" for return-type
//! checks. `conform` is the typed counterpart: it decodes a dynamic value into
//! a concrete Rust type or reports why it cannot.

use crate::encode::is_non_finite;
use crate::hint::TypeHint;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// A value failed to conform to its declared type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected {expected} at {path}, found {found}")]
pub struct ValidationError {
    /// Hint the offending value was checked against
    pub expected: String,
    /// Location inside the value (`$` is the root)
    pub path: String,
    /// Compact rendering of the offending value
    pub found: String,
}

impl ValidationError {
    fn new(expected: impl Into<String>, path: &str, found: &Value) -> Self {
        Self {
            expected: expected.into(),
            path: path.to_string(),
            found: render(found),
        }
    }
}

fn render(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 80 {
        let head: String = text.chars().take(77).collect();
        format!("{head}...")
    } else {
        text
    }
}

/// Check that `value` conforms to `hint`
///
/// Conformance is structural and strict: an integer hint accepts only
/// integral numbers, strings are never coerced to numbers. A float hint also
/// accepts the non-finite encodings `"NaN"`, `"inf"` and `"-inf"`.
///
/// # Errors
///
/// Returns the first mismatch found, depth first.
pub fn validate(hint: &TypeHint, value: &Value) -> Result<(), ValidationError> {
    check(hint, value, "$")
}

/// Whether `value` conforms to `hint`
#[must_use]
pub fn conforms(hint: &TypeHint, value: &Value) -> bool {
    validate(hint, value).is_ok()
}

fn check(hint: &TypeHint, value: &Value, path: &str) -> Result<(), ValidationError> {
    let mismatch = || Err(ValidationError::new(hint.to_string(), path, value));
    match (hint, value) {
        (TypeHint::Any, _)
        | (TypeHint::None, Value::Null)
        | (TypeHint::Bool, Value::Bool(_))
        | (TypeHint::Str, Value::String(_))
        | (TypeHint::Float, Value::Number(_))
        | (TypeHint::Optional(_), Value::Null) => Ok(()),
        (TypeHint::Float, Value::String(s)) if is_non_finite(s) => Ok(()),
        (TypeHint::Int, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
        (TypeHint::IntRange { min, max }, Value::Number(n)) => {
            let v = n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from));
            match v {
                Some(v) if (*min..=*max).contains(&v) => Ok(()),
                _ => mismatch(),
            }
        }
        (TypeHint::List(inner), Value::Array(items)) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| check(inner, item, &format!("{path}[{i}]"))),
        (TypeHint::Dict(inner), Value::Object(map)) => map
            .iter()
            .try_for_each(|(key, item)| check(inner, item, &format!("{path}.{key}"))),
        (TypeHint::Tuple(hints), Value::Array(items)) if hints.len() == items.len() => hints
            .iter()
            .zip(items)
            .enumerate()
            .try_for_each(|(i, (h, item))| check(h, item, &format!("{path}[{i}]"))),
        (TypeHint::Optional(inner), _) => check(inner, value, path),
        (TypeHint::Union(hints), _) => {
            if hints.iter().any(|h| check(h, value, path).is_ok()) {
                Ok(())
            } else {
                mismatch()
            }
        }
        _ => mismatch(),
    }
}

/// Decode a dynamic value into `T`
///
/// # Errors
///
/// Returns a `ValidationError` naming the Rust type when decoding fails.
pub fn conform<T: DeserializeOwned>(value: &Value) -> Result<T, ValidationError> {
    T::deserialize(value).map_err(|e| ValidationError {
        expected: std::any::type_name::<T>().to_string(),
        path: "$".to_string(),
        found: format!("{} ({e})", render(value)),
    })
}

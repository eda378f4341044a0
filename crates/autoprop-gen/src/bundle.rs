//! Argument bundles
//!
//! One synthesized call: positional values plus named values, shaped after
//! the target's signature.

use crate::signature::Signature;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Named argument values in insertion order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Kwargs(Vec<(String, Value)>);

impl Kwargs {
    /// Empty keyword set
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Value for `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Whether `name` is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, v)| v)
    }

    /// Number of named values
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no named values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Kwargs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Kwargs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A bundle could not be matched against a signature
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// More positional values than positional parameters
    #[error("{given} positional values for {accepted} positional parameters")]
    TooManyPositional {
        /// Positional values in the bundle
        given: usize,
        /// Parameters accepting positional values
        accepted: usize,
    },
    /// Named value for a parameter that does not exist
    #[error("unexpected keyword `{0}`")]
    UnexpectedKeyword(String),
    /// Parameter received both a positional and a named value
    #[error("multiple values for `{0}`")]
    MultipleValues(String),
    /// Parameter received no value and has no default
    #[error("missing value for `{0}`")]
    Missing(String),
}

/// One synthesized set of call arguments
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ArgumentBundle {
    args: Vec<Value>,
    kwargs: Kwargs,
}

impl ArgumentBundle {
    /// Assemble a bundle
    #[must_use]
    pub const fn new(args: Vec<Value>, kwargs: Kwargs) -> Self {
        Self { args, kwargs }
    }

    /// Positional values
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Named values
    #[must_use]
    pub const fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    /// Resolve one value per parameter, in signature order
    ///
    /// Parameters missing from the bundle fall back to their declared default.
    ///
    /// # Errors
    ///
    /// Returns a `BindError` when the bundle does not fit the signature.
    pub fn bind<'a>(&'a self, signature: &'a Signature) -> Result<Vec<&'a Value>, BindError> {
        let params = signature.params();
        let accepted = params
            .iter()
            .take_while(|p| p.kind.accepts_positional())
            .count();
        if self.args.len() > accepted {
            return Err(BindError::TooManyPositional {
                given: self.args.len(),
                accepted,
            });
        }
        if let Some(name) = self.kwargs.keys().find(|k| signature.param(k).is_none()) {
            return Err(BindError::UnexpectedKeyword(name.to_string()));
        }

        params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let named = self.kwargs.get(&param.name);
                match (self.args.get(i), named) {
                    (Some(_), Some(_)) => Err(BindError::MultipleValues(param.name.clone())),
                    (Some(value), None) | (None, Some(value)) => Ok(value),
                    (None, None) => param
                        .default
                        .as_ref()
                        .ok_or_else(|| BindError::Missing(param.name.clone())),
                }
            })
            .collect()
    }

    /// Value bound to parameter `name`
    #[must_use]
    pub fn value<'a>(&'a self, signature: &Signature, name: &str) -> Option<&'a Value> {
        let index = signature.position(name)?;
        self.args.get(index).or_else(|| self.kwargs.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hint::TypeHint;
    use crate::signature::{Param, ParamKind};
    use serde_json::json;

    fn signature() -> Signature {
        Signature::builder()
            .param("a", TypeHint::Int)
            .param("b", TypeHint::Int)
            .push(Param::untyped("c").with_default(0))
            .build()
            .unwrap()
    }

    fn kwargs(pairs: &[(&str, Value)]) -> Kwargs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_bind_mixed() {
        let sig = signature();
        let bundle = ArgumentBundle::new(vec![json!(1)], kwargs(&[("b", json!(2))]));
        let bound = bundle.bind(&sig).unwrap();
        assert_eq!(bound, [&json!(1), &json!(2), &json!(0)]);
    }

    #[test]
    fn test_bind_errors() {
        let sig = signature();
        let too_many = ArgumentBundle::new(vec![json!(1), json!(2), json!(3), json!(4)], Kwargs::new());
        assert!(matches!(
            too_many.bind(&sig),
            Err(BindError::TooManyPositional { given: 4, accepted: 3 })
        ));

        let unknown = ArgumentBundle::new(vec![], kwargs(&[("z", json!(1))]));
        assert_eq!(
            unknown.bind(&sig),
            Err(BindError::UnexpectedKeyword("z".to_string()))
        );

        let twice = ArgumentBundle::new(vec![json!(1)], kwargs(&[("a", json!(1)), ("b", json!(2))]));
        assert_eq!(twice.bind(&sig), Err(BindError::MultipleValues("a".to_string())));

        let missing = ArgumentBundle::new(vec![], kwargs(&[("a", json!(1))]));
        assert_eq!(missing.bind(&sig), Err(BindError::Missing("b".to_string())));
    }

    #[test]
    fn test_keyword_only_not_positional() {
        let sig = Signature::builder()
            .param("a", TypeHint::Int)
            .push(Param::new("k", TypeHint::Int).with_kind(ParamKind::KeywordOnly))
            .build()
            .unwrap();
        let bundle = ArgumentBundle::new(vec![json!(1), json!(2)], Kwargs::new());
        assert!(matches!(
            bundle.bind(&sig),
            Err(BindError::TooManyPositional { accepted: 1, .. })
        ));
    }

    #[test]
    fn test_value_lookup() {
        let sig = signature();
        let bundle = ArgumentBundle::new(vec![json!(1)], kwargs(&[("b", json!(2))]));
        assert_eq!(bundle.value(&sig, "a"), Some(&json!(1)));
        assert_eq!(bundle.value(&sig, "b"), Some(&json!(2)));
        assert_eq!(bundle.value(&sig, "c"), None);
        assert_eq!(bundle.value(&sig, "nope"), None);
    }

    #[test]
    fn test_kwargs_serialize_in_order() {
        let bundle = ArgumentBundle::new(
            vec![json!(true)],
            kwargs(&[("zeta", json!(1)), ("alpha", json!(2))]),
        );
        let text = serde_json::to_string(&bundle).unwrap();
        assert_eq!(text, r#"{"args":[true],"kwargs":{"zeta":1,"alpha":2}}"#);
    }
}

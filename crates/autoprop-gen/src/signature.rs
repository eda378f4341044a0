//! Signature introspection
//!
//! A `Signature` is the descriptor table of a target: its ordered parameters
//! with their declared types and its declared return type. It is built once
//! per target and passed explicitly through the pipeline.

use crate::error::{Error, Result};
use crate::hint::TypeHint;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a parameter may be passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Only by position
    PositionalOnly,
    /// By position or by name
    #[default]
    PositionalOrKeyword,
    /// Only by name
    KeywordOnly,
}

impl ParamKind {
    /// Whether a positional value can bind to this parameter
    #[must_use]
    pub const fn accepts_positional(&self) -> bool {
        matches!(self, Self::PositionalOnly | Self::PositionalOrKeyword)
    }
}

/// One formal parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Declared type; `None` means untyped
    #[serde(default)]
    pub hint: Option<TypeHint>,
    /// Passing convention
    #[serde(default)]
    pub kind: ParamKind,
    /// Declared default value
    #[serde(default)]
    pub default: Option<Value>,
}

impl Param {
    /// A typed positional-or-keyword parameter
    #[must_use]
    pub fn new(name: impl Into<String>, hint: TypeHint) -> Self {
        Self {
            name: name.into(),
            hint: Some(hint),
            kind: ParamKind::PositionalOrKeyword,
            default: None,
        }
    }

    /// An untyped positional-or-keyword parameter
    #[must_use]
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: None,
            kind: ParamKind::PositionalOrKeyword,
            default: None,
        }
    }

    /// Set the passing convention
    #[must_use]
    pub const fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the declared default
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Ordered parameters plus declared return type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Signature {
    params: Vec<Param>,
    #[serde(default)]
    returns: Option<TypeHint>,
}

impl Signature {
    /// Start building a signature
    #[must_use]
    pub fn builder() -> SignatureBuilder {
        SignatureBuilder::default()
    }

    /// Build from parts, checking ordering and uniqueness
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSignature` on duplicate names or a
    /// positional-only parameter after a non-positional-only one.
    pub fn from_parts(params: Vec<Param>, returns: Option<TypeHint>) -> Result<Self> {
        let signature = Self { params, returns };
        signature.check()?;
        Ok(signature)
    }

    /// Parse from YAML, checking ordering and uniqueness
    ///
    /// # Errors
    ///
    /// Returns an error on malformed YAML or an invalid parameter list.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let signature: Self = serde_yaml::from_str(yaml)?;
        signature.check()?;
        Ok(signature)
    }

    fn check(&self) -> Result<()> {
        let mut seen_other = false;
        for (i, param) in self.params.iter().enumerate() {
            if param.name.is_empty() {
                return Err(Error::InvalidSignature(format!(
                    "parameter {i} has an empty name"
                )));
            }
            if self.params[..i].iter().any(|p| p.name == param.name) {
                return Err(Error::InvalidSignature(format!(
                    "duplicate parameter `{}`",
                    param.name
                )));
            }
            match param.kind {
                ParamKind::PositionalOnly if seen_other => {
                    return Err(Error::InvalidSignature(format!(
                        "positional-only parameter `{}` follows other parameters",
                        param.name
                    )));
                }
                ParamKind::PositionalOnly => {}
                _ => seen_other = true,
            }
        }
        Ok(())
    }

    /// Parameters in declaration order
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Declared return type
    #[must_use]
    pub const fn returns(&self) -> Option<&TypeHint> {
        self.returns.as_ref()
    }

    /// Look up a parameter by name
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Position of a parameter by name
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the target takes no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Fluent builder for [`Signature`]
#[derive(Debug, Default)]
pub struct SignatureBuilder {
    params: Vec<Param>,
    returns: Option<TypeHint>,
}

impl SignatureBuilder {
    /// Add a typed positional-or-keyword parameter
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, hint: TypeHint) -> Self {
        self.params.push(Param::new(name, hint));
        self
    }

    /// Add an untyped parameter
    #[must_use]
    pub fn untyped(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::untyped(name));
        self
    }

    /// Add a fully specified parameter
    #[must_use]
    pub fn push(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Declare the return type
    #[must_use]
    pub fn returns(mut self, hint: TypeHint) -> Self {
        self.returns = Some(hint);
        self
    }

    /// Finish the signature
    ///
    /// # Errors
    ///
    /// See [`Signature::from_parts`].
    pub fn build(self) -> Result<Signature> {
        Signature::from_parts(self.params, self.returns)
    }
}

/// Anything that can describe its own parameters
pub trait Introspect {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Parameter metadata, if the target carries any
    fn signature(&self) -> Option<&Signature>;
}

/// Fetch the signature of a target without calling it
///
/// # Errors
///
/// Returns `Error::MissingSignature` when the target has no metadata.
pub fn introspect<T: Introspect + ?Sized>(target: &T) -> Result<&Signature> {
    target
        .signature()
        .ok_or_else(|| Error::MissingSignature(target.name().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_signature() -> Signature {
        Signature::builder()
            .param("a", TypeHint::Int)
            .param("b", TypeHint::Int)
            .returns(TypeHint::Int)
            .build()
            .expect("valid signature")
    }

    #[test]
    fn test_builder_preserves_order() {
        let sig = add_signature();
        let names: Vec<&str> = sig.params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(sig.returns(), Some(&TypeHint::Int));
        assert_eq!(sig.position("b"), Some(1));
        assert_eq!(sig.len(), 2);
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = Signature::builder()
            .param("a", TypeHint::Int)
            .untyped("a")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSignature(_)));
    }

    #[test]
    fn test_rejects_late_positional_only() {
        let err = Signature::builder()
            .param("a", TypeHint::Int)
            .push(Param::new("b", TypeHint::Int).with_kind(ParamKind::PositionalOnly))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("positional-only"));
    }

    #[test]
    fn test_untyped_with_default() {
        let sig = Signature::builder()
            .push(Param::untyped("sep").with_default(","))
            .build()
            .unwrap();
        let param = sig.param("sep").unwrap();
        assert!(param.hint.is_none());
        assert_eq!(param.default, Some(Value::from(",")));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r"
params:
  - name: xs
    hint: list[int]
  - name: scale
    hint: float
    kind: keyword_only
returns: float
";
        let sig = Signature::from_yaml(yaml).unwrap();
        assert_eq!(sig.params()[0].hint, Some(TypeHint::list(TypeHint::Int)));
        assert_eq!(sig.params()[1].kind, ParamKind::KeywordOnly);
        assert_eq!(sig.returns(), Some(&TypeHint::Float));
    }

    #[test]
    fn test_from_yaml_rejects_bad_hint() {
        let yaml = "params:\n  - name: x\n    hint: integer\n";
        assert!(matches!(
            Signature::from_yaml(yaml),
            Err(Error::YamlError(_))
        ));
    }

    struct Opaque;

    impl Introspect for Opaque {
        fn name(&self) -> &str {
            "opaque"
        }

        fn signature(&self) -> Option<&Signature> {
            None
        }
    }

    #[test]
    fn test_introspect_missing_signature() {
        let err = introspect(&Opaque).unwrap_err();
        assert_eq!(err.to_string(), "No signature available for opaque");
    }
}

//! Callables under test
//!
//! A `TargetFn` pairs a name and a signature with a body taking an argument
//! bundle. Typed constructors derive the signature from Rust argument and
//! return types and decode each argument before calling the closure.

use crate::bundle::{ArgumentBundle, BindError};
use crate::encode::{decode_float, encode_value};
use crate::error::Result;
use crate::hint::{HasTypeHint, TypeHint};
use crate::signature::{Introspect, Param, Signature};
use crate::validate::{ValidationError, conform};
use serde::Serialize;
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a target while running
pub type Raised = Box<dyn std::error::Error + Send + Sync + 'static>;

type Body = Arc<dyn Fn(&ArgumentBundle) -> std::result::Result<Value, Raised> + Send + Sync>;

/// A typed target received a value it could not decode
#[derive(Debug, Error)]
pub enum ArgumentTypeError {
    /// Bundle shape does not match the signature
    #[error("cannot bind arguments: {0}")]
    Bind(#[from] BindError),
    /// Argument value does not decode into the parameter type
    #[error("argument `{param}`: {source}")]
    Decode {
        /// Parameter name
        param: String,
        /// Decoding failure
        source: ValidationError,
    },
    /// Return value could not be encoded
    #[error("cannot encode return value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A named callable with optional parameter metadata
#[derive(Clone)]
pub struct TargetFn {
    name: String,
    signature: Option<Signature>,
    body: Body,
}

impl std::fmt::Debug for TargetFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetFn")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl TargetFn {
    /// Dynamic target with an explicit signature
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&ArgumentBundle) -> std::result::Result<Value, Raised> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature: Some(signature),
            body: Arc::new(body),
        }
    }

    /// Dynamic target without parameter metadata
    pub fn opaque<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&ArgumentBundle) -> std::result::Result<Value, Raised> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature: None,
            body: Arc::new(body),
        }
    }

    /// Call the body
    ///
    /// # Errors
    ///
    /// Returns whatever the body raises.
    pub fn call(&self, bundle: &ArgumentBundle) -> std::result::Result<Value, Raised> {
        (self.body)(bundle)
    }

    /// Target name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether two handles share one body
    #[must_use]
    pub fn same_body(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl Introspect for TargetFn {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }
}

fn decode<T: DeserializeOwned>(
    param: &str,
    value: &Value,
) -> std::result::Result<T, ArgumentTypeError> {
    conform(value).or_else(|source| {
        // "NaN" / "inf" markers decode as floats
        value
            .is_string()
            .then(|| decode_float(value))
            .flatten()
            .and_then(|f| {
                T::deserialize(IntoDeserializer::<serde::de::value::Error>::into_deserializer(f)).ok()
            })
            .ok_or_else(|| ArgumentTypeError::Decode {
                param: param.to_string(),
                source,
            })
    })
}

fn typed_signature<R: HasTypeHint>(names: &[&str], hints: Vec<TypeHint>) -> Result<Signature> {
    let params = names
        .iter()
        .zip(hints)
        .map(|(name, hint)| Param::new(*name, hint))
        .collect();
    Signature::from_parts(params, Some(R::type_hint()))
}

macro_rules! typed_constructors {
    ($typed:ident, $try_typed:ident, $n:literal; $($arg:ident: $ty:ident),+) => {
        impl TargetFn {
            #[doc = concat!("Typed target with ", stringify!($n), " argument(s)")]
            ///
            /// # Errors
            ///
            /// Returns `Error::InvalidSignature` on duplicate parameter names.
            pub fn $typed<$($ty,)+ R, F>(
                name: impl Into<String>,
                params: [&str; $n],
                f: F,
            ) -> Result<Self>
            where
                $($ty: DeserializeOwned + HasTypeHint + 'static,)+
                R: Serialize + HasTypeHint + 'static,
                F: Fn($($ty),+) -> R + Send + Sync + 'static,
            {
                Self::$try_typed(name, params, move |$($arg: $ty),+| {
                    Ok::<R, std::convert::Infallible>(f($($arg),+))
                })
            }

            #[doc = concat!("Fallible typed target with ", stringify!($n), " argument(s)")]
            ///
            /// # Errors
            ///
            /// Returns `Error::InvalidSignature` on duplicate parameter names.
            pub fn $try_typed<$($ty,)+ R, E, F>(
                name: impl Into<String>,
                params: [&str; $n],
                f: F,
            ) -> Result<Self>
            where
                $($ty: DeserializeOwned + HasTypeHint + 'static,)+
                R: Serialize + HasTypeHint + 'static,
                E: Into<Raised>,
                F: Fn($($ty),+) -> std::result::Result<R, E> + Send + Sync + 'static,
            {
                let signature = typed_signature::<R>(&params, vec![$($ty::type_hint()),+])?;
                let bound_signature = signature.clone();
                let names: Vec<String> = params.iter().map(ToString::to_string).collect();
                Ok(Self::new(name, signature, move |bundle: &ArgumentBundle| {
                    let bound = bundle
                        .bind(&bound_signature)
                        .map_err(ArgumentTypeError::from)?;
                    let mut values = bound.into_iter().zip(&names);
                    $(
                        let $arg: $ty = {
                            let (value, param) = values
                                .next()
                                .ok_or_else(|| ArgumentTypeError::Bind(BindError::Missing(String::new())))?;
                            decode(param, value)?
                        };
                    )+
                    let result = f($($arg),+).map_err(Into::<Raised>::into)?;
                    Ok(encode_value(&result).map_err(ArgumentTypeError::from)?)
                }))
            }
        }
    };
}

typed_constructors!(typed1, try_typed1, 1; a: A);
typed_constructors!(typed2, try_typed2, 2; a: A, b: B);
typed_constructors!(typed3, try_typed3, 3; a: A, b: B, c: C);
typed_constructors!(typed4, try_typed4, 4; a: A, b: B, c: C, d: D);

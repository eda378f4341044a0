//! autoprop argument generation
//!
//! Turns a callable's declared signature into a bounded, reproducible
//! sequence of argument bundles.
//!
//! # Pipeline
//!
//! `signature` describes the target, `resolver` picks one strategy per
//! parameter (explicit overrides first, then declared types), and
//! `generator` samples the composed strategy. Value generation is backed by
//! proptest; conformance checks live in `validate`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_closure_for_method_calls))]

pub mod bundle;
pub mod config;
pub mod encode;
pub mod error;
pub mod generator;
pub mod hint;
pub mod resolver;
pub mod signature;
pub mod strategies;
pub mod target;
pub mod validate;

pub use bundle::{ArgumentBundle, BindError, Kwargs};
pub use config::GenerationConfig;
pub use encode::{decode_float, encode_float, encode_value};
pub use error::{Error, Result};
pub use generator::{DEFAULT_LIMIT, ParameterGenerator, auto_parameters};
pub use hint::{HasTypeHint, TypeHint};
pub use resolver::{JointStrategy, Override, Overrides, ResolvedParam, Source, resolve};
pub use signature::{Introspect, Param, ParamKind, Signature, SignatureBuilder, introspect};
pub use strategies::{Sampler, ValueStrategy, constant_generator, derive_generator};
pub use target::{ArgumentTypeError, Raised, TargetFn};
pub use validate::{ValidationError, conform, conforms, validate};

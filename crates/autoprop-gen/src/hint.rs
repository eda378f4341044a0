//! Declared parameter and return types
//!
//! A `TypeHint` is the descriptor the generation and validation capabilities
//! dispatch on. It has a compact textual form (`list[int]`, `Optional[str]`)
//! used in YAML configs and diagnostics.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Declared type of a parameter or return value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeHint {
    /// Any value
    Any,
    /// The null value
    None,
    /// Boolean
    Bool,
    /// Integral number
    Int,
    /// Integral number within `min..=max`
    IntRange {
        /// Smallest accepted value
        min: i128,
        /// Largest accepted value
        max: i128,
    },
    /// Any number
    Float,
    /// Text
    Str,
    /// Homogeneous list
    List(Box<TypeHint>),
    /// String-keyed map
    Dict(Box<TypeHint>),
    /// Fixed-length heterogeneous sequence
    Tuple(Vec<TypeHint>),
    /// Null or the inner type
    Optional(Box<TypeHint>),
    /// One of several types
    Union(Vec<TypeHint>),
}

impl TypeHint {
    /// `list[inner]`
    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    /// `dict[str, value]`
    #[must_use]
    pub fn dict(value: Self) -> Self {
        Self::Dict(Box::new(value))
    }

    /// `int[min, max]`
    #[must_use]
    pub const fn int_range(min: i128, max: i128) -> Self {
        Self::IntRange { min, max }
    }

    /// `Optional[inner]`
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Parse the textual form of a hint
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTypeHint` on unknown names or malformed brackets.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser { input, pos: 0 };
        let hint = parser
            .hint()
            .and_then(|hint| {
                parser.skip_ws();
                if parser.pos == input.len() {
                    Ok(hint)
                } else {
                    Err(format!("unexpected trailing input at offset {}", parser.pos))
                }
            })
            .map_err(|reason| Error::InvalidTypeHint {
                input: input.to_string(),
                reason,
            })?;
        Ok(hint)
    }
}

impl std::fmt::Display for TypeHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "Any"),
            Self::None => write!(f, "None"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::IntRange { min, max } => write!(f, "int[{min}, {max}]"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "str"),
            Self::List(inner) => write!(f, "list[{inner}]"),
            Self::Dict(value) => write!(f, "dict[str, {value}]"),
            Self::Tuple(items) => write!(f, "tuple[{}]", join(items)),
            Self::Optional(inner) => write!(f, "Optional[{inner}]"),
            Self::Union(items) => write!(f, "Union[{}]", join(items)),
        }
    }
}

fn join(items: &[TypeHint]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for TypeHint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TypeHint {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TypeHint> for String {
    fn from(hint: TypeHint) -> Self {
        hint.to_string()
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.input[self.pos..].starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = &self.input[self.pos..];
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    fn integer(&mut self) -> std::result::Result<i128, String> {
        self.skip_ws();
        let rest = &self.input[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
            .map_or(rest.len(), |(i, _)| i);
        let value = rest[..len]
            .parse()
            .map_err(|_| format!("expected an integer at offset {}", self.pos))?;
        self.pos += len;
        Ok(value)
    }

    fn expect(&mut self, c: char) -> std::result::Result<(), String> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(format!("expected `{c}` at offset {}", self.pos))
        }
    }

    fn hint(&mut self) -> std::result::Result<TypeHint, String> {
        let name = self
            .ident()
            .ok_or_else(|| format!("expected a type name at offset {}", self.pos))?;

        if name == "int" && self.eat('[') {
            let min = self.integer()?;
            self.expect(',')?;
            let max = self.integer()?;
            self.expect(']')?;
            if min > max {
                return Err(format!("empty int range [{min}, {max}]"));
            }
            return Ok(TypeHint::int_range(min, max));
        }

        let args = if self.eat('[') {
            let mut args = Vec::new();
            if !self.eat(']') {
                args.push(self.hint()?);
                while self.eat(',') {
                    args.push(self.hint()?);
                }
                self.expect(']')?;
            }
            Some(args)
        } else {
            None
        };

        match (name, args) {
            ("Any", None) => Ok(TypeHint::Any),
            ("None", None) => Ok(TypeHint::None),
            ("bool", None) => Ok(TypeHint::Bool),
            ("int", None) => Ok(TypeHint::Int),
            ("float", None) => Ok(TypeHint::Float),
            ("str", None) => Ok(TypeHint::Str),
            ("list" | "List", Some(args)) => single(name, args).map(TypeHint::list),
            ("dict" | "Dict", Some(args)) => {
                let [key, value]: [TypeHint; 2] = args
                    .try_into()
                    .map_err(|_| format!("`{name}` takes a key and a value type"))?;
                if key != TypeHint::Str {
                    return Err(format!("dict keys must be `str`, got `{key}`"));
                }
                Ok(TypeHint::dict(value))
            }
            ("tuple" | "Tuple", Some(args)) => Ok(TypeHint::Tuple(args)),
            ("Optional", Some(args)) => single(name, args).map(TypeHint::optional),
            ("Union", Some(mut args)) => {
                if args.is_empty() {
                    Err("`Union` takes at least one type argument".to_string())
                } else if args.len() == 1 {
                    Ok(args.remove(0))
                } else {
                    Ok(TypeHint::Union(args))
                }
            }
            (other, _) => Err(format!("unknown or malformed type `{other}`")),
        }
    }
}

fn single(name: &str, mut args: Vec<TypeHint>) -> std::result::Result<TypeHint, String> {
    if args.len() == 1 {
        Ok(args.remove(0))
    } else {
        Err(format!("`{name}` takes exactly one type argument"))
    }
}

/// Compile-time type token: maps a Rust type to its declared hint
pub trait HasTypeHint {
    /// The hint describing values of this type
    fn type_hint() -> TypeHint;
}

macro_rules! scalar_hint {
    ($hint:expr => $($ty:ty),+) => {
        $(impl HasTypeHint for $ty {
            fn type_hint() -> TypeHint {
                $hint
            }
        })+
    };
}

macro_rules! bounded_hint {
    ($($ty:ty),+) => {
        $(impl HasTypeHint for $ty {
            #[allow(clippy::cast_lossless)]
            fn type_hint() -> TypeHint {
                TypeHint::int_range(<$ty>::MIN as i128, <$ty>::MAX as i128)
            }
        })+
    };
}

scalar_hint!(TypeHint::Int => i64);
bounded_hint!(i8, i16, i32, isize, u8, u16, u32, u64, usize);
scalar_hint!(TypeHint::Float => f32, f64);
scalar_hint!(TypeHint::Bool => bool);
scalar_hint!(TypeHint::Str => String);
scalar_hint!(TypeHint::None => ());
scalar_hint!(TypeHint::Any => Value);

impl<T: HasTypeHint> HasTypeHint for Vec<T> {
    fn type_hint() -> TypeHint {
        TypeHint::list(T::type_hint())
    }
}

impl<T: HasTypeHint> HasTypeHint for Option<T> {
    fn type_hint() -> TypeHint {
        TypeHint::optional(T::type_hint())
    }
}

impl<T: HasTypeHint> HasTypeHint for BTreeMap<String, T> {
    fn type_hint() -> TypeHint {
        TypeHint::dict(T::type_hint())
    }
}

impl<T: HasTypeHint, S> HasTypeHint for HashMap<String, T, S> {
    fn type_hint() -> TypeHint {
        TypeHint::dict(T::type_hint())
    }
}

impl<A: HasTypeHint, B: HasTypeHint> HasTypeHint for (A, B) {
    fn type_hint() -> TypeHint {
        TypeHint::Tuple(vec![A::type_hint(), B::type_hint()])
    }
}

impl<A: HasTypeHint, B: HasTypeHint, C: HasTypeHint> HasTypeHint for (A, B, C) {
    fn type_hint() -> TypeHint {
        TypeHint::Tuple(vec![A::type_hint(), B::type_hint(), C::type_hint()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(TypeHint::parse("int").unwrap(), TypeHint::Int);
        assert_eq!(TypeHint::parse(" str ").unwrap(), TypeHint::Str);
        assert_eq!(TypeHint::parse("None").unwrap(), TypeHint::None);
        assert_eq!(TypeHint::parse("Any").unwrap(), TypeHint::Any);
    }

    #[test]
    fn test_parse_nested() {
        let hint = TypeHint::parse("Optional[list[dict[str, int]]]").unwrap();
        assert_eq!(
            hint,
            TypeHint::optional(TypeHint::list(TypeHint::dict(TypeHint::Int)))
        );
    }

    #[test]
    fn test_parse_tuple_and_union() {
        assert_eq!(
            TypeHint::parse("tuple[int, str, bool]").unwrap(),
            TypeHint::Tuple(vec![TypeHint::Int, TypeHint::Str, TypeHint::Bool])
        );
        assert_eq!(
            TypeHint::parse("Union[int, None]").unwrap(),
            TypeHint::Union(vec![TypeHint::Int, TypeHint::None])
        );
        assert_eq!(TypeHint::parse("Union[float]").unwrap(), TypeHint::Float);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "",
            "integer",
            "list",
            "list[int",
            "dict[int, str]",
            "int]",
            "Optional[int, str]",
            "list[]",
            "Union[]",
            "int[5, 1]",
            "int[0]",
            "int[a, b]",
        ] {
            let err = TypeHint::parse(input).unwrap_err();
            assert!(
                matches!(err, Error::InvalidTypeHint { .. }),
                "{input:?} should fail"
            );
        }
    }

    #[test]
    fn test_display_matches_parse() {
        let hint = TypeHint::Tuple(vec![
            TypeHint::list(TypeHint::Float),
            TypeHint::optional(TypeHint::Str),
            TypeHint::dict(TypeHint::Bool),
        ]);
        let text = hint.to_string();
        assert_eq!(text, "tuple[list[float], Optional[str], dict[str, bool]]");
        assert_eq!(TypeHint::parse(&text).unwrap(), hint);
    }

    #[test]
    fn test_empty_tuple_round_trips() {
        let hint = TypeHint::Tuple(vec![]);
        assert_eq!(hint.to_string(), "tuple[]");
        assert_eq!(TypeHint::parse("tuple[]").unwrap(), hint);
        assert_eq!(TypeHint::parse("tuple[ ]").unwrap(), hint);
        let nested = TypeHint::list(TypeHint::Tuple(vec![]));
        assert_eq!(TypeHint::parse(&nested.to_string()).unwrap(), nested);
    }

    #[test]
    fn test_int_range_text_form() {
        let hint = TypeHint::parse("int[-128, 127]").unwrap();
        assert_eq!(hint, TypeHint::int_range(-128, 127));
        assert_eq!(hint.to_string(), "int[-128, 127]");
        let wide = u64::type_hint();
        assert_eq!(TypeHint::parse(&wide.to_string()).unwrap(), wide);
    }

    #[test]
    fn test_serde_uses_text_form() {
        let json = serde_json::to_string(&TypeHint::list(TypeHint::Int)).unwrap();
        assert_eq!(json, "\"list[int]\"");
        let hint: TypeHint = serde_yaml::from_str("Optional[str]").unwrap();
        assert_eq!(hint, TypeHint::optional(TypeHint::Str));
        assert!(serde_yaml::from_str::<TypeHint>("nope").is_err());
    }

    #[test]
    fn test_type_tokens() {
        assert_eq!(i64::type_hint(), TypeHint::Int);
        assert_eq!(u8::type_hint(), TypeHint::int_range(0, 255));
        assert_eq!(i32::type_hint().to_string(), "int[-2147483648, 2147483647]");
        assert_eq!(usize::type_hint(), TypeHint::int_range(0, usize::MAX as i128));
        assert_eq!(<Vec<Option<String>>>::type_hint().to_string(), "list[Optional[str]]");
        assert_eq!(<(i64, f64)>::type_hint().to_string(), "tuple[int, float]");
        assert_eq!(<BTreeMap<String, bool>>::type_hint().to_string(), "dict[str, bool]");
        assert_eq!(<()>::type_hint(), TypeHint::None);
        assert_eq!(Value::type_hint(), TypeHint::Any);
    }
}

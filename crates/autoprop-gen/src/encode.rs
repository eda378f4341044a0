//! Lossless value encoding
//!
//! Works like `serde_json::to_value`, except non-finite floats become the
//! strings `"NaN"`, `"inf"` and `"-inf"` instead of `null`. Typed targets
//! encode their results through here so a declared `float` return stays a
//! `float` whatever its value.

use serde::Serialize;
use serde::ser::{self, Error as _};
use serde_json::{Map, Number, Value};

/// Encoded form of NaN
pub const NAN: &str = "NaN";
/// Encoded form of positive infinity
pub const INFINITY: &str = "inf";
/// Encoded form of negative infinity
pub const NEG_INFINITY: &str = "-inf";

type Error = serde_json::Error;

/// Encode `value`, keeping non-finite floats
///
/// # Errors
///
/// Returns an error for map keys that are not scalars, integers outside the
/// 64-bit range, or a failing `Serialize` impl.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, Error> {
    value.serialize(ValueEncoder)
}

/// Encode one float
#[must_use]
pub fn encode_float(value: f64) -> Value {
    match Number::from_f64(value) {
        Some(number) => Value::Number(number),
        None if value.is_nan() => Value::String(NAN.to_string()),
        None if value.is_sign_positive() => Value::String(INFINITY.to_string()),
        None => Value::String(NEG_INFINITY.to_string()),
    }
}

/// Read a float written by [`encode_float`] or any JSON number
#[must_use]
pub fn decode_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.as_str() {
            NAN => Some(f64::NAN),
            INFINITY => Some(f64::INFINITY),
            NEG_INFINITY => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

/// Whether `s` is one of the non-finite float encodings
#[must_use]
pub fn is_non_finite(s: &str) -> bool {
    matches!(s, NAN | INFINITY | NEG_INFINITY)
}

struct ValueEncoder;

impl ser::Serializer for ValueEncoder {
    type Ok = Value;
    type Error = Error;
    type SerializeSeq = SeqEncoder;
    type SerializeTuple = SeqEncoder;
    type SerializeTupleStruct = SeqEncoder;
    type SerializeTupleVariant = TupleVariantEncoder;
    type SerializeMap = MapEncoder;
    type SerializeStruct = MapEncoder;
    type SerializeStructVariant = StructVariantEncoder;

    fn serialize_bool(self, v: bool) -> Result<Value, Error> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, Error> {
        if let Ok(v) = i64::try_from(v) {
            Ok(Value::from(v))
        } else if let Ok(v) = u64::try_from(v) {
            Ok(Value::from(v))
        } else {
            Err(Error::custom(format!("integer {v} is out of range")))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Value, Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, Error> {
        u64::try_from(v)
            .map(Value::from)
            .map_err(|_| Error::custom(format!("integer {v} is out of range")))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, Error> {
        Ok(encode_float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, Error> {
        Ok(encode_float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, Error> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, Error> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, Error> {
        Ok(Value::Array(v.iter().map(|b| Value::from(*b)).collect()))
    }

    fn serialize_none(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, Error> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Error> {
        let mut map = Map::new();
        map.insert(variant.to_owned(), encode_value(value)?);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqEncoder, Error> {
        Ok(SeqEncoder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqEncoder, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqEncoder, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantEncoder, Error> {
        Ok(TupleVariantEncoder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapEncoder, Error> {
        Ok(MapEncoder {
            map: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapEncoder, Error> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructVariantEncoder, Error> {
        Ok(StructVariantEncoder {
            variant,
            map: Map::new(),
        })
    }
}

struct SeqEncoder {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.items.push(encode_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Error> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Error> {
        ser::SerializeSeq::end(self)
    }
}

struct TupleVariantEncoder {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for TupleVariantEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.items.push(encode_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        let mut map = Map::new();
        map.insert(self.variant.to_owned(), Value::Array(self.items));
        Ok(Value::Object(map))
    }
}

struct MapEncoder {
    map: Map<String, Value>,
    next_key: Option<String>,
}

fn map_key<T: ?Sized + Serialize>(key: &T) -> Result<String, Error> {
    match encode_value(key)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::custom(format!("map key must be a scalar, got {other}"))),
    }
}

impl ser::SerializeMap for MapEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Error> {
        self.next_key = Some(map_key(key)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::custom("map value without a key"))?;
        self.map.insert(key, encode_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for MapEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.map.insert(key.to_owned(), encode_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Object(self.map))
    }
}

struct StructVariantEncoder {
    variant: &'static str,
    map: Map<String, Value>,
}

impl ser::SerializeStructVariant for StructVariantEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.map.insert(key.to_owned(), encode_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        let mut outer = Map::new();
        outer.insert(self.variant.to_owned(), Value::Object(self.map));
        Ok(Value::Object(outer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Reading {
        label: String,
        value: f64,
        samples: Vec<f32>,
    }

    #[derive(Serialize)]
    enum Shape {
        Point,
        Circle(f64),
        Pair(i32, f64),
        Rect { w: f64, h: f64 },
    }

    #[test]
    fn test_non_finite_floats_are_strings() {
        assert_eq!(encode_value(&f64::NAN).unwrap(), json!("NaN"));
        assert_eq!(encode_value(&f64::INFINITY).unwrap(), json!("inf"));
        assert_eq!(encode_value(&f64::NEG_INFINITY).unwrap(), json!("-inf"));
        assert_eq!(encode_value(&f32::INFINITY).unwrap(), json!("inf"));
        assert_eq!(encode_value(&1.5f64).unwrap(), json!(1.5));
    }

    #[test]
    fn test_nested_floats_are_kept() {
        let reading = Reading {
            label: "r".to_string(),
            value: f64::NAN,
            samples: vec![1.0, f32::NEG_INFINITY],
        };
        assert_eq!(
            encode_value(&reading).unwrap(),
            json!({"label": "r", "value": "NaN", "samples": [1.0, "-inf"]})
        );
        assert_eq!(encode_value(&Some(vec![(1u8, f64::INFINITY)])).unwrap(), json!([[1, "inf"]]));
    }

    #[test]
    fn test_matches_serde_json_for_finite_values() {
        let mut map = BTreeMap::new();
        map.insert(3u32, vec!["a", "b"]);
        let shapes = vec![
            Shape::Point,
            Shape::Circle(2.0),
            Shape::Pair(-1, 0.5),
            Shape::Rect { w: 1.0, h: 2.0 },
        ];
        assert_eq!(encode_value(&map).unwrap(), serde_json::to_value(&map).unwrap());
        assert_eq!(encode_value(&shapes).unwrap(), serde_json::to_value(&shapes).unwrap());
        assert_eq!(encode_value(&()).unwrap(), Value::Null);
        assert_eq!(encode_value(&u64::MAX).unwrap(), json!(u64::MAX));
    }

    #[test]
    fn test_out_of_range_integer() {
        assert!(encode_value(&i128::MAX).is_err());
        assert_eq!(encode_value(&-5i128).unwrap(), json!(-5));
    }

    #[test]
    fn test_decode_float() {
        assert!(decode_float(&json!("NaN")).unwrap().is_nan());
        assert_eq!(decode_float(&json!("-inf")), Some(f64::NEG_INFINITY));
        assert_eq!(decode_float(&json!(2)), Some(2.0));
        assert_eq!(decode_float(&json!("nan")), None);
        assert_eq!(decode_float(&Value::Null), None);
        assert!(is_non_finite("inf"));
        assert!(!is_non_finite("infinity"));
    }
}

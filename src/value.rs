//! gNMI typed values
//!
//! [`TypedValue`] mirrors the wire oneof; [`TypedValue::decode`] turns it
//! into a [`LeafValue`] that can be stored in a document.

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Decimal number as carried on the wire: `digits * 10^-precision`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decimal64 {
    pub digits: i64,
    #[serde(default)]
    pub precision: u32,
}

/// A gNMI value, exactly one encoding populated
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Int(i64),
    Uint(u64),
    Bool(bool),
    Bytes(Vec<u8>),
    Float(f64),
    Decimal(Decimal64),
    LeafList(Vec<TypedValue>),
    Json(Vec<u8>),
    JsonIetf(Vec<u8>),
    Ascii(String),
    ProtoBytes(Vec<u8>),
}

/// A decoded value ready to be placed in a document
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    String(String),
    Int(i64),
    Bool(bool),
    Bytes(Vec<u8>),
    Float(f64),
    List(Vec<LeafValue>),
    Json(Value),
}

impl TypedValue {
    /// Wire name of the populated tag
    pub fn tag(&self) -> &'static str {
        match self {
            TypedValue::String(_) => "string_val",
            TypedValue::Int(_) => "int_val",
            TypedValue::Uint(_) => "uint_val",
            TypedValue::Bool(_) => "bool_val",
            TypedValue::Bytes(_) => "bytes_val",
            TypedValue::Float(_) => "float_val",
            TypedValue::Decimal(_) => "decimal_val",
            TypedValue::LeafList(_) => "leaflist_val",
            TypedValue::Json(_) => "json_val",
            TypedValue::JsonIetf(_) => "json_ietf_val",
            TypedValue::Ascii(_) => "ascii_val",
            TypedValue::ProtoBytes(_) => "proto_bytes",
        }
    }

    /// True when the value carries an embedded JSON document
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, TypedValue::Json(_) | TypedValue::JsonIetf(_))
    }

    /// Encode a configuration value as a JSON_IETF payload
    pub fn json_ietf(config: &Value) -> Result<Self> {
        Ok(TypedValue::JsonIetf(serde_json::to_vec(config)?))
    }

    /// Decode into a native value
    ///
    /// Unsigned integers above `i64::MAX` become their decimal string so
    /// they survive JSON encoding downstream. Decimals keep only their
    /// digits; the precision is left to the caller.
    pub fn decode(&self) -> Result<LeafValue> {
        let decoded = match self {
            TypedValue::String(s) | TypedValue::Ascii(s) => LeafValue::String(s.clone()),
            TypedValue::Int(i) => LeafValue::Int(*i),
            TypedValue::Uint(u) => match i64::try_from(*u) {
                Ok(i) => LeafValue::Int(i),
                Err(_) => LeafValue::String(u.to_string()),
            },
            TypedValue::Bool(b) => LeafValue::Bool(*b),
            TypedValue::Bytes(b) | TypedValue::ProtoBytes(b) => LeafValue::Bytes(b.clone()),
            TypedValue::Float(f) => LeafValue::Float(*f),
            TypedValue::Decimal(d) => LeafValue::String(d.digits.to_string()),
            TypedValue::LeafList(elements) => LeafValue::List(
                elements
                    .iter()
                    .map(TypedValue::decode)
                    .collect::<Result<Vec<_>>>()?,
            ),
            TypedValue::Json(raw) | TypedValue::JsonIetf(raw) => {
                LeafValue::Json(serde_json::from_slice(raw)?)
            }
        };
        Ok(decoded)
    }

    /// Build a value from its wire tag name and a JSON payload
    ///
    /// Bytes payloads are base64 strings. JSON payloads may be given either
    /// as the document itself or as a string holding the encoded document.
    pub fn from_tag(tag: &str, payload: &Value) -> Result<Self> {
        let bad = || Error::UnknownValueTag(format!("{tag} with payload {payload}"));
        let value = match tag {
            "string_val" => TypedValue::String(payload.as_str().ok_or_else(bad)?.to_string()),
            "ascii_val" => TypedValue::Ascii(payload.as_str().ok_or_else(bad)?.to_string()),
            "int_val" => TypedValue::Int(payload.as_i64().ok_or_else(bad)?),
            "uint_val" => TypedValue::Uint(payload.as_u64().ok_or_else(bad)?),
            "bool_val" => TypedValue::Bool(payload.as_bool().ok_or_else(bad)?),
            "float_val" => TypedValue::Float(payload.as_f64().ok_or_else(bad)?),
            "bytes_val" => TypedValue::Bytes(decode_base64(payload).ok_or_else(bad)?),
            "proto_bytes" => TypedValue::ProtoBytes(decode_base64(payload).ok_or_else(bad)?),
            "decimal_val" => TypedValue::Decimal(serde_json::from_value(payload.clone())?),
            "leaflist_val" => {
                let elements = payload["element"].as_array().ok_or_else(bad)?;
                TypedValue::LeafList(
                    elements
                        .iter()
                        .map(|e| {
                            let (tag, inner) = single_entry(e)?;
                            TypedValue::from_tag(tag, inner)
                        })
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            "json_val" => TypedValue::Json(embedded_json(payload)?),
            "json_ietf_val" => TypedValue::JsonIetf(embedded_json(payload)?),
            other => return Err(Error::UnknownValueTag(other.to_string())),
        };
        Ok(value)
    }
}

impl<'de> Deserialize<'de> for TypedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let (tag, payload) = single_entry(&raw).map_err(serde::de::Error::custom)?;
        TypedValue::from_tag(tag, payload).map_err(serde::de::Error::custom)
    }
}

impl Serialize for TypedValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let payload = match self {
            TypedValue::String(s) | TypedValue::Ascii(s) => json!(s),
            TypedValue::Int(i) => json!(i),
            TypedValue::Uint(u) => json!(u),
            TypedValue::Bool(b) => json!(b),
            TypedValue::Bytes(b) | TypedValue::ProtoBytes(b) => {
                json!(base64::engine::general_purpose::STANDARD.encode(b))
            }
            TypedValue::Float(f) => json!(f),
            TypedValue::Decimal(d) => json!(d),
            TypedValue::LeafList(elements) => json!({ "element": elements }),
            TypedValue::Json(raw) | TypedValue::JsonIetf(raw) => {
                json!(String::from_utf8_lossy(raw))
            }
        };
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.tag(), &payload)?;
        map.end()
    }
}

impl LeafValue {
    /// Convert to JSON for a document; bytes become base64 text
    pub fn into_json(self) -> Value {
        match self {
            LeafValue::String(s) => Value::String(s),
            LeafValue::Int(i) => json!(i),
            LeafValue::Bool(b) => Value::Bool(b),
            LeafValue::Bytes(b) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(b))
            }
            // NaN and infinities have no JSON form
            LeafValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            LeafValue::List(items) => {
                Value::Array(items.into_iter().map(LeafValue::into_json).collect())
            }
            LeafValue::Json(v) => v,
        }
    }
}

/// The only `(tag, payload)` pair of a one-key object
fn single_entry(raw: &Value) -> Result<(&str, &Value)> {
    let obj = raw
        .as_object()
        .ok_or_else(|| Error::UnknownValueTag(raw.to_string()))?;
    let mut entries = obj.iter();
    match (entries.next(), entries.next()) {
        (Some((tag, payload)), None) => Ok((tag.as_str(), payload)),
        _ => Err(Error::UnknownValueTag(raw.to_string())),
    }
}

fn decode_base64(payload: &Value) -> Option<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(payload.as_str()?)
        .ok()
}

fn embedded_json(payload: &Value) -> Result<Vec<u8>> {
    match payload {
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        other => Ok(serde_json::to_vec(other)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_overflow_becomes_string() {
        let big = TypedValue::Uint(1u64 << 63);
        assert_eq!(
            big.decode().unwrap(),
            LeafValue::String("9223372036854775808".into())
        );

        let small = TypedValue::Uint(42);
        assert_eq!(small.decode().unwrap(), LeafValue::Int(42));

        let edge = TypedValue::Uint(i64::MAX as u64);
        assert_eq!(edge.decode().unwrap(), LeafValue::Int(i64::MAX));
    }

    #[test]
    fn test_scalar_tags() {
        assert_eq!(
            TypedValue::String("up".into()).decode().unwrap(),
            LeafValue::String("up".into())
        );
        assert_eq!(TypedValue::Int(-7).decode().unwrap(), LeafValue::Int(-7));
        assert_eq!(TypedValue::Bool(true).decode().unwrap(), LeafValue::Bool(true));
        assert_eq!(TypedValue::Float(1.5).decode().unwrap(), LeafValue::Float(1.5));
        assert_eq!(
            TypedValue::ProtoBytes(vec![1, 2]).decode().unwrap(),
            LeafValue::Bytes(vec![1, 2])
        );
        assert_eq!(
            TypedValue::Ascii("hostname r1".into()).decode().unwrap(),
            LeafValue::String("hostname r1".into())
        );
    }

    #[test]
    fn test_decimal_keeps_digits_only() {
        let d = TypedValue::Decimal(Decimal64 {
            digits: 12345,
            precision: 2,
        });
        assert_eq!(d.decode().unwrap(), LeafValue::String("12345".into()));
    }

    #[test]
    fn test_leaf_list_decodes_each_element() {
        let list = TypedValue::LeafList(vec![
            TypedValue::String("a".into()),
            TypedValue::Uint(u64::MAX),
            TypedValue::Bool(false),
        ]);
        assert_eq!(
            list.decode().unwrap(),
            LeafValue::List(vec![
                LeafValue::String("a".into()),
                LeafValue::String(u64::MAX.to_string()),
                LeafValue::Bool(false),
            ])
        );
    }

    #[test]
    fn test_json_payload_parsed() {
        let v = TypedValue::JsonIetf(br#"{"name": "eth0", "mtu": 1500}"#.to_vec());
        assert_eq!(
            v.decode().unwrap(),
            LeafValue::Json(json!({"name": "eth0", "mtu": 1500}))
        );
        assert!(v.is_json());
        assert!(!TypedValue::Ascii(String::new()).is_json());
    }

    #[test]
    fn test_invalid_json_payload_is_error() {
        let v = TypedValue::Json(b"{not json".to_vec());
        assert!(matches!(v.decode().unwrap_err(), Error::Json(_)));
    }

    #[test]
    fn test_into_json_encodes_bytes_base64() {
        assert_eq!(LeafValue::Bytes(b"hi".to_vec()).into_json(), json!("aGk="));
        assert_eq!(LeafValue::Float(f64::NAN).into_json(), Value::Null);
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(
            TypedValue::from_tag("uint_val", &json!(5)).unwrap(),
            TypedValue::Uint(5)
        );
        assert_eq!(
            TypedValue::from_tag("json_ietf_val", &json!({"a": 1})).unwrap(),
            TypedValue::JsonIetf(br#"{"a":1}"#.to_vec())
        );
        let list = TypedValue::from_tag(
            "leaflist_val",
            &json!({"element": [{"string_val": "x"}, {"int_val": 2}]}),
        )
        .unwrap();
        assert_eq!(
            list,
            TypedValue::LeafList(vec![TypedValue::String("x".into()), TypedValue::Int(2)])
        );
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = TypedValue::from_tag("any_val", &json!({})).unwrap_err();
        assert!(matches!(err, Error::UnknownValueTag(ref t) if t == "any_val"));
    }

    #[test]
    fn test_serialize_matches_from_tag() {
        let original = TypedValue::LeafList(vec![
            TypedValue::Bytes(vec![0xde, 0xad]),
            TypedValue::Decimal(Decimal64 { digits: 5, precision: 1 }),
        ]);
        let encoded = serde_json::to_value(&original).unwrap();
        let back: TypedValue = serde_json::from_value(encoded).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_deserialize_one_key_object() {
        let v: TypedValue = serde_json::from_value(json!({"bool_val": true})).unwrap();
        assert_eq!(v, TypedValue::Bool(true));
        assert!(serde_json::from_value::<TypedValue>(json!({"a": 1, "b": 2})).is_err());
    }
}

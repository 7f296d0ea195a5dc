//! Wire codecs for normalized values.
//!
//! [`Value`] implements `Serialize`/`Deserialize` directly, keeping map
//! order, which is what the JSON codec uses. `bincode` is not
//! self-describing, so the binary codec goes through the tagged [`Wire`] enum.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize as DeriveDeserialize, Serialize as DeriveSerialize};
use serde_core::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_core::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

use super::{Map, Value};
use crate::Error;

// -----------------------------------------------------------------------------
// Serialize

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for item in list {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut ser = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    ser.serialize_entry(key, value)?;
                }
                ser.end()
            }
            Value::Object(object) => Err(S::Error::custom(alloc::format!(
                "cannot encode an object of class \"{}\"",
                object.class_name()
            ))),
        }
    }
}

// -----------------------------------------------------------------------------
// Deserialize

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a structural value")
    }

    #[inline]
    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    #[inline]
    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    #[inline]
    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(match i64::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Float(v as f64),
        })
    }

    #[inline]
    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    #[inline]
    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.into()))
    }

    #[inline]
    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    #[inline]
    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    #[inline]
    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            list.push(item);
        }
        Ok(Value::List(list))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

// -----------------------------------------------------------------------------
// Wire

/// The binary representation of a normalized value.
#[derive(Debug, DeriveSerialize, DeriveDeserialize)]
enum Wire {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Wire>),
    Map(Vec<(String, Wire)>),
}

impl TryFrom<&Value> for Wire {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Error> {
        Ok(match value {
            Value::Null => Wire::Null,
            Value::Bool(b) => Wire::Bool(*b),
            Value::Int(i) => Wire::Int(*i),
            Value::Float(f) => Wire::Float(*f),
            Value::String(s) => Wire::String(s.clone()),
            Value::List(list) => Wire::List(
                list.iter()
                    .map(Wire::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(map) => Wire::Map(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), Wire::try_from(v)?)))
                    .collect::<Result<_, Error>>()?,
            ),
            Value::Object(_) => return Err(Error::Unencodable),
        })
    }
}

impl From<Wire> for Value {
    fn from(wire: Wire) -> Self {
        match wire {
            Wire::Null => Value::Null,
            Wire::Bool(b) => Value::Bool(b),
            Wire::Int(i) => Value::Int(i),
            Wire::Float(f) => Value::Float(f),
            Wire::String(s) => Value::String(s),
            Wire::List(list) => Value::List(list.into_iter().map(Value::from).collect()),
            Wire::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// -----------------------------------------------------------------------------
// Codecs

/// Encodes a normalized value as JSON.
pub fn to_json(value: &Value) -> Result<String, Error> {
    ensure_encodable(value)?;
    Ok(serde_json::to_string(value)?)
}

/// Encodes a normalized value as indented JSON.
pub fn to_json_pretty(value: &Value) -> Result<String, Error> {
    ensure_encodable(value)?;
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json(json: &str) -> Result<Value, Error> {
    Ok(serde_json::from_str(json)?)
}

/// Encodes a normalized value with `bincode`'s standard configuration.
pub fn to_binary(value: &Value) -> Result<Vec<u8>, Error> {
    let wire = Wire::try_from(value)?;
    Ok(bincode::serde::encode_to_vec(&wire, bincode::config::standard())?)
}

pub fn from_binary(bytes: &[u8]) -> Result<Value, Error> {
    let (wire, _): (Wire, usize) =
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(Value::from(wire))
}

fn ensure_encodable(value: &Value) -> Result<(), Error> {
    match value {
        Value::Object(_) => Err(Error::Unencodable),
        Value::List(list) => list.iter().try_for_each(ensure_encodable),
        Value::Map(map) => map.values().try_for_each(ensure_encodable),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::DynamicObject;

    fn sample() -> Value {
        Value::from_iter([
            ("id", Value::from(1)),
            ("name", Value::from("t")),
            ("ratio", Value::from(0.5)),
            ("tags", Value::from_iter([Value::from("a"), Value::Null])),
            ("nested", Value::from_iter([("ok", true)])),
        ])
    }

    #[test]
    fn json_keeps_order() {
        let json = to_json(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"name":"t","ratio":0.5,"tags":["a",null],"nested":{"ok":true}}"#
        );
        assert_eq!(from_json(&json).unwrap(), sample());
    }

    #[test]
    fn binary_codec() {
        let bytes = to_binary(&sample()).unwrap();
        assert_eq!(from_binary(&bytes).unwrap(), sample());
    }

    #[test]
    fn objects_are_rejected() {
        let value = Value::from_iter([("o", Value::Object(DynamicObject::std().into_ref()))]);
        assert!(matches!(to_json(&value), Err(Error::Unencodable)));
        assert!(matches!(to_binary(&value), Err(Error::Unencodable)));
    }
}

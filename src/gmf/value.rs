#![forbid(unsafe_code)]

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A decoded GMF value. Every container owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Null,
    Bool(bool),
    Int(i32),
    UInt(u32),
    Double(f64),
    Float(f32),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<DynamicValue>),
    /// Keys keep first-insertion order; a repeated key overwrites the value.
    Object(IndexMap<String, DynamicValue>),
    /// Fixed-length vector of values.
    Vector(Box<[DynamicValue]>),
    /// Fixed-length vector of `i32`.
    IntVector(Box<[i32]>),
}

impl DynamicValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            DynamicValue::Null => "null",
            DynamicValue::Bool(_) => "bool",
            DynamicValue::Int(_) => "int",
            DynamicValue::UInt(_) => "uint",
            DynamicValue::Double(_) => "double",
            DynamicValue::Float(_) => "float",
            DynamicValue::String(_) => "string",
            DynamicValue::Bytes(_) => "bytes",
            DynamicValue::Array(_) => "array",
            DynamicValue::Object(_) => "object",
            DynamicValue::Vector(_) => "vector",
            DynamicValue::IntVector(_) => "int vector",
        }
    }

    /// Looks up `key` if this is an object.
    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        match self {
            DynamicValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, DynamicValue>> {
        match self {
            DynamicValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Textual form of a scalar; `None` for null and containers.
    pub fn to_text(&self) -> Option<String> {
        match self {
            DynamicValue::String(s) => Some(s.clone()),
            DynamicValue::Bool(b) => Some(b.to_string()),
            DynamicValue::Int(v) => Some(v.to_string()),
            DynamicValue::UInt(v) => Some(v.to_string()),
            DynamicValue::Double(v) => Some(v.to_string()),
            DynamicValue::Float(v) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl Serialize for DynamicValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DynamicValue::Null => serializer.serialize_unit(),
            DynamicValue::Bool(b) => serializer.serialize_bool(*b),
            DynamicValue::Int(v) => serializer.serialize_i32(*v),
            DynamicValue::UInt(v) => serializer.serialize_u32(*v),
            DynamicValue::Double(v) => serializer.serialize_f64(*v),
            DynamicValue::Float(v) => serializer.serialize_f32(*v),
            DynamicValue::String(s) => serializer.serialize_str(s),
            DynamicValue::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for b in bytes {
                    seq.serialize_element(b)?;
                }
                seq.end()
            }
            DynamicValue::Array(items) => items.serialize(serializer),
            DynamicValue::Vector(items) => items.serialize(serializer),
            DynamicValue::IntVector(items) => items.serialize(serializer),
            DynamicValue::Object(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_plain_json() {
        let mut map = IndexMap::new();
        map.insert("z".to_string(), DynamicValue::Int(1));
        map.insert("a".to_string(), DynamicValue::Bytes(vec![1, 2]));
        map.insert(
            "v".to_string(),
            DynamicValue::IntVector(vec![3, 4].into_boxed_slice()),
        );
        map.insert("n".to_string(), DynamicValue::Null);
        let json = serde_json::to_string(&DynamicValue::Object(map)).unwrap();
        assert_eq!(json, r#"{"z":1,"a":[1,2],"v":[3,4],"n":null}"#);
    }

    #[test]
    fn scalar_text() {
        assert_eq!(DynamicValue::String("1.2.3".into()).to_text().as_deref(), Some("1.2.3"));
        assert_eq!(DynamicValue::Int(7).to_text().as_deref(), Some("7"));
        assert_eq!(DynamicValue::Null.to_text(), None);
        assert_eq!(DynamicValue::Array(vec![]).to_text(), None);
    }
}

//! Dynamic TL values.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One decoded or to-be-encoded TL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Int128([u8; 16]),
    Int256([u8; 32]),
    Double(f64),
    Bool(bool),
    /// Presence of a `true` argument
    True,
    String(String),
    Bytes(Vec<u8>),
    Vector(Vec<Value>),
    Object(Box<Object>),
}

impl Value {
    /// Short description of the value's shape, for mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Int128(_) => "int128",
            Value::Int256(_) => "int256",
            Value::Double(_) => "double",
            Value::Bool(_) => "Bool",
            Value::True => "true",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Vector(_) => "vector",
            Value::Object(_) => "object",
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(Box::new(object))
    }
}

// Byte-like values render as hex strings so decoded output stays readable JSON.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) => serializer.serialize_i32(*v),
            Value::Long(v) => serializer.serialize_i64(*v),
            Value::Int128(v) => serializer.serialize_str(&hex::encode(v)),
            Value::Int256(v) => serializer.serialize_str(&hex::encode(v)),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::True => serializer.serialize_bool(true),
            Value::String(v) => serializer.serialize_str(v),
            Value::Bytes(v) => serializer.serialize_str(&hex::encode(v)),
            Value::Vector(items) => items.serialize(serializer),
            Value::Object(object) => object.serialize(serializer),
        }
    }
}

/// A constructor instance: its definition's name and tag plus field values.
///
/// Absent flagged fields are simply missing from `fields`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
    #[serde(rename = "_")]
    pub name: String,
    #[serde(skip)]
    pub id: u32,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Object {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:08x}", self.name, self.id)
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        })*
    };
}

value_from! {
    i32 => Int,
    i64 => Long,
    f64 => Double,
    bool => Bool,
    String => String,
    Vec<u8> => Bytes,
    Vec<Value> => Vector,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

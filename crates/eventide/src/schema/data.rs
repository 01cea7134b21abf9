use eventide_core::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Payload value exchanged between callers and data schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Named fields of a record type
    Record(BTreeMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Shape of an event payload
///
/// Registered per `(event name, version)` in the schema registry.
/// Implementations decide the payload wire format.
pub trait DataSchema: Clone + fmt::Debug {
    /// Whether `value` conforms to this schema
    fn valid(&self, value: &Value) -> bool;

    /// Encode a conforming value
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decode bytes produced by [`encode`](Self::encode)
    fn decode(&self, bytes: &[u8]) -> Result<Value>;

    /// Serialize the schema itself, for storage in the registry
    fn encode_schema(&self) -> Result<Vec<u8>>;
}

/// Turns stored schema bytes back into a [`DataSchema`]
pub trait SchemaDecoder {
    type Schema: DataSchema;

    fn decode_schema(&self, bytes: &[u8]) -> Result<Self::Schema>;
}

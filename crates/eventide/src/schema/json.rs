//! JSON data-schema strategy
//!
//! Schemas and payloads are both stored as JSON. Payloads are plain JSON
//! documents (records and maps become objects, bytes become arrays of
//! numbers); decoding is driven by the schema, so the tagged [`Value`] comes
//! back with the same variants it was encoded from.

use super::data::{DataSchema, SchemaDecoder, Value};
use eventide_core::error::{EventideError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as Json};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsonSchema {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Optional(Box<JsonSchema>),
    Array(Box<JsonSchema>),
    Map(Box<JsonSchema>),
    /// Every field is optional on the wire, but unknown fields are rejected
    Record {
        name: String,
        fields: BTreeMap<String, JsonSchema>,
    },
}

impl JsonSchema {
    /// Record schema from `(field, schema)` pairs
    pub fn record<I, K>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, JsonSchema)>,
        K: Into<String>,
    {
        JsonSchema::Record {
            name: name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    fn to_json(value: &Value) -> Json {
        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => Json::from(*f),
            Value::String(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
            Value::Array(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Value::Map(entries) | Value::Record(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::to_json(v)))
                    .collect::<JsonMap<_, _>>(),
            ),
        }
    }

    fn decode_json(&self, json: Json) -> Result<Value> {
        match (self, json) {
            (JsonSchema::Null, Json::Null) => Ok(Value::Null),
            (JsonSchema::Bool, Json::Bool(b)) => Ok(Value::Bool(b)),
            (JsonSchema::Int, Json::Number(n)) => n
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| mismatch("int", &Json::Number(n))),
            (JsonSchema::Float, Json::Number(n)) => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| mismatch("float", &Json::Number(n))),
            (JsonSchema::String, Json::String(s)) => Ok(Value::String(s)),
            (JsonSchema::Bytes, Json::Array(items)) => items
                .into_iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|b| u8::try_from(b).ok())
                        .ok_or_else(|| mismatch("byte", &item))
                })
                .collect::<Result<Vec<u8>>>()
                .map(Value::Bytes),
            (JsonSchema::Optional(_), Json::Null) => Ok(Value::Null),
            (JsonSchema::Optional(inner), json) => inner.decode_json(json),
            (JsonSchema::Array(inner), Json::Array(items)) => items
                .into_iter()
                .map(|item| inner.decode_json(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            (JsonSchema::Map(inner), Json::Object(entries)) => entries
                .into_iter()
                .map(|(k, v)| Ok((k, inner.decode_json(v)?)))
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Value::Map),
            (JsonSchema::Record { name, fields }, Json::Object(entries)) => entries
                .into_iter()
                .map(|(k, v)| {
                    let field = fields.get(&k).ok_or_else(|| {
                        EventideError::Schema(format!("unknown field {} in record {}", k, name))
                    })?;
                    Ok((k, field.decode_json(v)?))
                })
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Value::Record),
            (schema, json) => Err(mismatch(schema.kind(), &json)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            JsonSchema::Null => "null",
            JsonSchema::Bool => "bool",
            JsonSchema::Int => "int",
            JsonSchema::Float => "float",
            JsonSchema::String => "string",
            JsonSchema::Bytes => "bytes",
            JsonSchema::Optional(_) => "optional",
            JsonSchema::Array(_) => "array",
            JsonSchema::Map(_) => "map",
            JsonSchema::Record { .. } => "record",
        }
    }
}

fn mismatch(expected: &str, found: &Json) -> EventideError {
    EventideError::Schema(format!("expected {}, found {}", expected, found))
}

impl DataSchema for JsonSchema {
    fn valid(&self, value: &Value) -> bool {
        match (self, value) {
            (JsonSchema::Null, Value::Null)
            | (JsonSchema::Bool, Value::Bool(_))
            | (JsonSchema::Int, Value::Int(_))
            | (JsonSchema::Float, Value::Float(_))
            | (JsonSchema::String, Value::String(_))
            | (JsonSchema::Bytes, Value::Bytes(_)) => true,
            (JsonSchema::Optional(_), Value::Null) => true,
            (JsonSchema::Optional(inner), value) => inner.valid(value),
            (JsonSchema::Array(inner), Value::Array(items)) => items.iter().all(|v| inner.valid(v)),
            (JsonSchema::Map(inner), Value::Map(entries)) => {
                entries.values().all(|v| inner.valid(v))
            }
            (JsonSchema::Record { fields, .. }, Value::Record(entries)) => {
                entries.iter().all(|(k, v)| {
                    fields
                        .get(k)
                        .map_or(false, |field| field.valid(v))
                })
            }
            _ => false,
        }
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        if !self.valid(value) {
            return Err(EventideError::Schema(format!(
                "{} value does not match {} schema",
                value.type_name(),
                self.kind()
            )));
        }
        serde_json::to_vec(&Self::to_json(value))
            .map_err(|e| EventideError::Serialization(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let json: Json = serde_json::from_slice(bytes)
            .map_err(|e| EventideError::Serialization(e.to_string()))?;
        self.decode_json(json)
    }

    fn encode_schema(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| EventideError::Serialization(e.to_string()))
    }
}

/// Decoder for schemas stored by [`JsonSchema::encode_schema`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaDecoder;

impl SchemaDecoder for JsonSchemaDecoder {
    type Schema = JsonSchema;

    fn decode_schema(&self, bytes: &[u8]) -> Result<JsonSchema> {
        serde_json::from_slice(bytes).map_err(|e| EventideError::Schema(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_schema() -> JsonSchema {
        JsonSchema::record(
            "User",
            [
                ("name", JsonSchema::String),
                ("age", JsonSchema::Int),
                ("email", JsonSchema::Optional(Box::new(JsonSchema::String))),
                ("tags", JsonSchema::Array(Box::new(JsonSchema::String))),
                ("avatar", JsonSchema::Bytes),
            ],
        )
    }

    fn user(fields: &[(&str, Value)]) -> Value {
        Value::Record(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_record_validation() {
        let schema = user_schema();

        assert!(schema.valid(&user(&[
            ("name", "alice".into()),
            ("age", 30i64.into()),
            ("email", Value::Null),
        ])));
        // Missing fields are allowed
        assert!(schema.valid(&user(&[("name", "bob".into())])));

        assert!(!schema.valid(&user(&[("age", "thirty".into())])));
        assert!(!schema.valid(&user(&[("nickname", "al".into())])));
        assert!(!schema.valid(&Value::Map(BTreeMap::new())));
    }

    #[test]
    fn test_encode_decode_preserves_variants() {
        let schema = user_schema();
        let value = user(&[
            ("name", "alice".into()),
            ("age", 30i64.into()),
            ("email", "a@example.com".into()),
            (
                "tags",
                Value::Array(vec!["admin".into(), "ops".into()]),
            ),
            ("avatar", Value::Bytes(vec![0, 1, 255])),
        ]);

        let bytes = schema.encode(&value).unwrap();
        assert_eq!(schema.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_encode_rejects_invalid_value() {
        let schema = JsonSchema::Int;
        assert!(matches!(
            schema.encode(&Value::String("1".into())),
            Err(EventideError::Schema(_))
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let schema = user_schema();
        assert!(schema.decode(br#"{"age": "old"}"#).is_err());
        assert!(schema.decode(br#"{"unknown": 1}"#).is_err());
        assert!(schema.decode(br#"{"avatar": [256]}"#).is_err());
        assert!(schema.decode(b"not json").is_err());
    }

    #[test]
    fn test_schema_roundtrip_through_decoder() {
        let schema = JsonSchema::Map(Box::new(JsonSchema::Optional(Box::new(JsonSchema::Float))));
        let bytes = schema.encode_schema().unwrap();
        assert_eq!(JsonSchemaDecoder.decode_schema(&bytes).unwrap(), schema);
    }
}

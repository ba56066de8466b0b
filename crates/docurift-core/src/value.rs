//! A dynamic JSON value with the structural-equality rules the schema store
//! relies on for example de-duplication.
//!
//! [`serde_json::Value`] already has a `PartialEq` impl, but it distinguishes
//! integers and floats at the `Number` level in a way that is easy to get
//! wrong when reasoning about "the same value turned up twice". [`JsonValue`]
//! makes that distinction explicit in the type itself.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A decoded JSON value, kept in insertion order for object fields so that
/// synthesized schemas and persisted snapshots read deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonValue {
    /// JSON `null`.
    Null,
    /// JSON `true`/`false`.
    Bool(bool),
    /// A JSON number known to be integral.
    ///
    /// Nothing along the capture path constructs this variant directly:
    /// `serde_json::Number` decoded from request/response bytes always
    /// becomes [`JsonValue::Float`]. It exists so callers constructing
    /// values programmatically (tests, the snapshot loader round-tripping
    /// a previously-integral value) can be explicit about intent.
    Int(i64),
    /// A JSON number that is not known to be integral, or any number
    /// decoded off the wire.
    Float(f64),
    /// A JSON string.
    String(String),
    /// A JSON array.
    Array(Vec<JsonValue>),
    /// A JSON object, preserving the order keys were first observed in.
    Object(IndexMap<String, JsonValue>),
}

impl JsonValue {
    /// The literal redacted placeholder value.
    pub fn redacted() -> Self {
        JsonValue::String("REDACTED".to_owned())
    }

    /// `true` if this value is a JSON object.
    pub fn is_object(&self) -> bool {
        matches!(self, JsonValue::Object(_))
    }

    /// `true` if this value is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    /// A short type tag used by the schema synthesizer for first-example
    /// type inference.
    pub fn kind(&self) -> ValueKind {
        match self {
            JsonValue::Null => ValueKind::Null,
            JsonValue::Bool(_) => ValueKind::Bool,
            JsonValue::Int(_) | JsonValue::Float(_) => ValueKind::Number,
            JsonValue::String(_) => ValueKind::String,
            JsonValue::Array(_) => ValueKind::Array,
            JsonValue::Object(_) => ValueKind::Object,
        }
    }
}

/// The coarse shape of a [`JsonValue`], used for property-schema inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// See [`JsonValue::Null`].
    Null,
    /// See [`JsonValue::Bool`].
    Bool,
    /// See [`JsonValue::Int`] and [`JsonValue::Float`].
    Number,
    /// See [`JsonValue::String`].
    String,
    /// See [`JsonValue::Array`].
    Array,
    /// See [`JsonValue::Object`].
    Object,
}

impl PartialEq for JsonValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsonValue::Null, JsonValue::Null) => true,
            (JsonValue::Bool(a), JsonValue::Bool(b)) => a == b,
            (JsonValue::Int(a), JsonValue::Int(b)) => a == b,
            (JsonValue::Float(a), JsonValue::Float(b)) => a == b,
            (JsonValue::String(a), JsonValue::String(b)) => a == b,
            (JsonValue::Array(a), JsonValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (JsonValue::Object(a), JsonValue::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other_v| v == other_v))
            }
            _ => false,
        }
    }
}

impl Eq for JsonValue {}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            // Every number decoded off the wire becomes a Float; JsonValue::Int
            // is reserved for values built directly by Rust call sites (see
            // the open-question note in SPEC_FULL.md).
            serde_json::Value::Number(n) => JsonValue::Float(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

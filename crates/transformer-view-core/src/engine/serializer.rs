//! Output serializers
//!
//! A serializer decides the envelope around transformed data. The flat
//! array serializer is the default for views; the data serializer is the
//! engine's native envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

/// Envelope policy for transformed output
pub trait Serializer: Send + Sync + fmt::Debug {
    /// Short name used in configuration and logs
    fn name(&self) -> &'static str;

    /// Wrap transformed collection data
    fn collection(&self, resource_key: Option<&str>, data: Vec<Value>) -> Value;

    /// Wrap transformed item data
    fn item(&self, resource_key: Option<&str>, data: Map<String, Value>) -> Value;

    /// Representation of an absent resource
    fn null(&self) -> Value;

    /// Entries merged into the envelope for resource meta
    fn meta(&self, meta: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();
        if !meta.is_empty() {
            out.insert("meta".to_string(), Value::Object(meta.clone()));
        }
        out
    }
}

/// No envelope: collections are arrays, items are objects, meta is dropped
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatArraySerializer;

impl Serializer for FlatArraySerializer {
    fn name(&self) -> &'static str {
        "array"
    }

    fn collection(&self, _resource_key: Option<&str>, data: Vec<Value>) -> Value {
        Value::Array(data)
    }

    fn item(&self, _resource_key: Option<&str>, data: Map<String, Value>) -> Value {
        Value::Object(data)
    }

    fn null(&self) -> Value {
        Value::Null
    }

    fn meta(&self, _meta: &Map<String, Value>) -> Map<String, Value> {
        Map::new()
    }
}

/// Everything under `data`
#[derive(Debug, Clone, Copy, Default)]
pub struct DataArraySerializer;

impl Serializer for DataArraySerializer {
    fn name(&self) -> &'static str {
        "data"
    }

    fn collection(&self, _resource_key: Option<&str>, data: Vec<Value>) -> Value {
        envelope("data", Value::Array(data))
    }

    fn item(&self, _resource_key: Option<&str>, data: Map<String, Value>) -> Value {
        envelope("data", Value::Object(data))
    }

    fn null(&self) -> Value {
        envelope("data", Value::Null)
    }
}

/// Collections under their resource key (or `data`), items bare
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedArraySerializer;

impl Serializer for KeyedArraySerializer {
    fn name(&self) -> &'static str {
        "keyed"
    }

    fn collection(&self, resource_key: Option<&str>, data: Vec<Value>) -> Value {
        envelope(resource_key.unwrap_or("data"), Value::Array(data))
    }

    fn item(&self, _resource_key: Option<&str>, data: Map<String, Value>) -> Value {
        Value::Object(data)
    }

    fn null(&self) -> Value {
        Value::Null
    }
}

fn envelope(key: &str, data: Value) -> Value {
    let mut out = Map::new();
    out.insert(key.to_string(), data);
    Value::Object(out)
}

/// Serializer choice in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializerKind {
    /// [`FlatArraySerializer`]
    #[default]
    Array,
    /// [`DataArraySerializer`]
    Data,
    /// [`KeyedArraySerializer`]
    Keyed,
}

impl SerializerKind {
    /// Instantiate the serializer
    pub fn build(self) -> Arc<dyn Serializer> {
        match self {
            SerializerKind::Array => Arc::new(FlatArraySerializer),
            SerializerKind::Data => Arc::new(DataArraySerializer),
            SerializerKind::Keyed => Arc::new(KeyedArraySerializer),
        }
    }
}

impl fmt::Display for SerializerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializerKind::Array => write!(f, "array"),
            SerializerKind::Data => write!(f, "data"),
            SerializerKind::Keyed => write!(f, "keyed"),
        }
    }
}

impl FromStr for SerializerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "array" => Ok(SerializerKind::Array),
            "data" => Ok(SerializerKind::Data),
            "keyed" => Ok(SerializerKind::Keyed),
            other => Err(Error::configuration(format!(
                "unknown serializer '{}', expected array, data or keyed",
                other
            ))),
        }
    }
}

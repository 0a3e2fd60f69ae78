//! Decoded structured data records.
//!
//! A [`Thing`] is one schema.org-style object decoded from a document. An
//! [`Entity`] pairs a Thing with the markup it came from.

use serde::Serialize;
use serde_json::{Map, Value};

/// A decoded structured data object.
///
/// Maps string keys to JSON values; values may be scalars, nested objects or
/// arrays of either. By convention the `@type` key names the schema.
///
/// # Example
///
/// ```rust
/// use harvest_core::Thing;
/// use serde_json::json;
///
/// let thing = Thing::try_from(json!({"@type": "Person", "name": "Ada"})).unwrap();
/// assert_eq!(thing.types(), vec!["Person"]);
/// assert_eq!(thing.get("name").and_then(|v| v.as_str()), Some("Ada"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Thing(Map<String, Value>);

impl Thing {
    /// Creates an empty Thing.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Gets the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Adds `value` under `key`.
    ///
    /// A key seen once holds a single value. Further values turn it into an
    /// array, in insertion order.
    pub fn append(&mut self, key: &str, value: Value) {
        match self.0.get_mut(key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.0.insert(key.to_string(), value);
            }
        }
    }

    /// The `@type` value(s) as strings.
    ///
    /// Handles both a single string and an array of strings; anything else
    /// yields an empty list.
    pub fn types(&self) -> Vec<&str> {
        match self.0.get("@type") {
            Some(Value::String(t)) => vec![t.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// The `@id` value, when it is a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get("@id").and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrows the underlying JSON map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Thing {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Thing {
    type Error = Value;

    /// Accepts JSON objects only; any other value is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl From<Thing> for Value {
    fn from(thing: Thing) -> Self {
        thing.into_value()
    }
}

/// A decoded [`Thing`] together with the markup it was decoded from.
///
/// Entities only exist for successful decodes, so `thing` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// Name of the extractor that produced this entity (`json-ld`, `microdata`).
    pub extractor: &'static str,

    /// The decoded object.
    pub thing: Thing,

    /// Outer HTML of the element the Thing was decoded from.
    pub source: String,
}

impl Entity {
    pub fn new(extractor: &'static str, thing: Thing, source: impl Into<String>) -> Self {
        Self { extractor, thing, source: source.into() }
    }
}

//! The per-format extractor contract and its result type.
//!
//! An [`Extractor`] turns a parsed [`Document`] into [`Entity`] records (the
//! typed path) or loosely typed JSON payloads (the raw path). Both paths are
//! total: a malformed fragment becomes a [`Skipped`] record, never an error,
//! and never affects the other fragments of the same document.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{Document, Entity};

/// Why a candidate element did not produce a result.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The element has no content to decode.
    #[error("element body is empty")]
    EmptyBody,

    /// The element body is not valid JSON.
    #[error("invalid JSON at line {line} column {column}: {message}")]
    InvalidJson { line: usize, column: usize, message: String },

    /// The JSON decoded, but a top-level node is not an object.
    #[error("top-level node is a {found}, expected an object")]
    NotAnObject { found: &'static str },

    /// Permissive recovery failed; an empty payload was emitted instead.
    #[error("no JSON object could be recovered: {message}")]
    Unrecoverable { message: String },
}

impl From<serde_json::Error> for SkipReason {
    fn from(err: serde_json::Error) -> Self {
        SkipReason::InvalidJson { line: err.line(), column: err.column(), message: err.to_string() }
    }
}

/// A candidate element that was left out of (or degraded in) the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    /// Name of the extractor that skipped the element.
    pub extractor: &'static str,
    /// Outer HTML of the skipped element.
    pub source: String,
    pub reason: SkipReason,
}

/// Items produced by an extractor plus the candidates it skipped.
///
/// # Example
///
/// ```rust
/// use harvest_core::{Document, Extractor, JsonLdExtractor};
///
/// let html = r#"
///     <script type="application/ld+json">{"@type": "Person", "name": "Ada"}</script>
///     <script type="application/ld+json">{"@type": </script>
/// "#;
/// let doc = Document::parse(html).unwrap();
/// let extraction = JsonLdExtractor::new().extract_entities(&doc);
///
/// assert_eq!(extraction.items.len(), 1);
/// assert_eq!(extraction.skipped.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction<T> {
    pub items: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> Default for Extraction<T> {
    fn default() -> Self {
        Self { items: Vec::new(), skipped: Vec::new() }
    }
}

impl<T> Extraction<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a skipped element and logs it.
    pub fn skip(&mut self, extractor: &'static str, source: String, reason: SkipReason) {
        tracing::warn!(extractor, %reason, "skipping structured data element");
        self.skipped.push(Skipped { extractor, source, reason });
    }

    /// Appends another extraction, keeping `self`'s items first.
    pub fn merge(&mut self, other: Extraction<T>) {
        self.items.extend(other.items);
        self.skipped.extend(other.skipped);
    }

    /// Drops the skip records.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// A structured data format extractor.
///
/// Implementations hold only their construction-time configuration, so one
/// instance can serve any number of documents, from any number of threads.
pub trait Extractor: Send + Sync {
    /// Short name recorded on entities and skip records.
    fn name(&self) -> &'static str;

    /// Decodes every candidate element into entities, in document order.
    fn extract_entities(&self, document: &Document) -> Extraction<Entity>;

    /// Decodes every candidate element into untyped JSON, in document order.
    fn extract_raw(&self, document: &Document) -> Extraction<Value>;

    fn entities(&self, document: &Document) -> Vec<Entity> {
        self.extract_entities(document).into_items()
    }

    fn raw(&self, document: &Document) -> Vec<Value> {
        self.extract_raw(document).into_items()
    }
}

/// Names a JSON value's kind for skip messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Meta tag extraction.
//!
//! Collects `<meta name|property="..." content="...">` pairs. Repeated keys
//! such as `og:image` keep every value, in document order.

use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter};
use serde::Serialize;

use crate::Document;

/// One meta key and all of its content values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaStatement {
    pub key: String,
    pub values: Vec<String>,
}

impl From<(String, Vec<String>)> for MetaStatement {
    fn from((key, values): (String, Vec<String>)) -> Self {
        Self { key, values }
    }
}

/// Meta statements of a document, keyed by name or property.
///
/// Keys keep the order in which they first appear. Values are never
/// deduplicated. Serializes as a JSON object of `key: [values]`.
///
/// # Example
///
/// ```rust
/// use harvest_core::extract_meta;
///
/// let meta = extract_meta(
///     r#"<meta property="og:image" content="a.jpg"><meta property="og:image" content="b.jpg">"#,
/// )
/// .unwrap();
/// assert_eq!(meta.get("og:image"), Some(&["a.jpg".to_string(), "b.jpg".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetaStatements(IndexMap<String, Vec<String>>);

impl MetaStatements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the values of `key`, creating the key if needed.
    pub fn push(&mut self, key: &str, value: &str) {
        self.0.entry(key.to_string()).or_default().push(value.to_string());
    }

    /// All values of `key`, in document order.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// The first value of `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, Vec<String>> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a MetaStatements {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for MetaStatements {
    type Item = MetaStatement;
    type IntoIter = std::iter::Map<IntoIter<String, Vec<String>>, fn((String, Vec<String>)) -> MetaStatement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter().map(MetaStatement::from as fn(_) -> _)
    }
}

/// Extracts meta tag statements.
#[derive(Debug, Clone, Default)]
pub struct MetaExtractor;

impl MetaExtractor {
    pub const NAME: &'static str = "meta";

    pub fn new() -> Self {
        Self
    }

    /// Groups the content of every `meta` element with a `content` attribute
    /// under its `property` and its `name`.
    ///
    /// An element carrying both attributes contributes to both keys, once if
    /// they are equal. Blank keys are ignored.
    pub fn extract(&self, document: &Document) -> MetaStatements {
        let mut statements = MetaStatements::new();
        let metas = document.select("meta[content]").unwrap_or_default();

        for meta in metas {
            let Some(content) = meta.attr("content") else {
                continue;
            };

            let property = meta.attr("property").map(str::trim).filter(|k| !k.is_empty());
            let name = meta.attr("name").map(str::trim).filter(|k| !k.is_empty());

            if let Some(property) = property {
                statements.push(property, content);
            }
            if let Some(name) = name
                && property != Some(name)
            {
                statements.push(name, content);
            }
        }

        tracing::debug!(keys = statements.len(), "meta extraction finished");
        statements
    }
}

//! JSON-LD extraction from `<script type="application/ld+json">` elements.
//!
//! Every script is decoded on its own, so one broken block never hides the
//! others. The typed path normalizes single objects, arrays and `@graph`
//! wrappers into a flat list of top-level nodes. The raw path is more
//! forgiving and trims stray text around the outermost braces.

use serde_json::{Map, Value};

use crate::extractor::json_kind;
use crate::parse::Element;
use crate::{Document, Entity, Extraction, Extractor, HarvestConfig, SkipReason, Thing};

const MEDIA_TYPE: &str = "application/ld+json";

/// Extracts JSON-LD blocks.
#[derive(Debug, Clone)]
pub struct JsonLdExtractor {
    strip_cdata: bool,
}

impl JsonLdExtractor {
    pub const NAME: &'static str = "json-ld";

    pub fn new() -> Self {
        Self::with_config(&HarvestConfig::default())
    }

    pub fn with_config(config: &HarvestConfig) -> Self {
        Self { strip_cdata: config.strip_cdata }
    }

    /// Script elements whose `type` ends with `application/ld+json`.
    ///
    /// The suffix match accepts vendor-prefixed media types and ignores case
    /// and surrounding whitespace.
    fn scripts<'a>(&self, document: &'a Document) -> Vec<Element<'a>> {
        let scripts: Vec<_> = document
            .select("script[type]")
            .unwrap_or_default()
            .into_iter()
            .filter(|script| {
                script
                    .attr("type")
                    .is_some_and(|t| t.trim().to_ascii_lowercase().ends_with(MEDIA_TYPE))
            })
            .collect();
        tracing::trace!(count = scripts.len(), "selected json-ld scripts");
        scripts
    }

    fn body(&self, script: &Element<'_>) -> String {
        let text = script.text();
        let body = text.trim();
        let body = if self.strip_cdata { strip_cdata(body) } else { body };
        body.to_string()
    }
}

impl Default for JsonLdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for JsonLdExtractor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extract_entities(&self, document: &Document) -> Extraction<Entity> {
        let mut extraction = Extraction::new();

        for script in self.scripts(document) {
            let source = script.outer_html();
            let body = self.body(&script);

            if body.is_empty() {
                extraction.skip(Self::NAME, source, SkipReason::EmptyBody);
                continue;
            }

            let value = match serde_json::from_str::<Value>(&body) {
                Ok(value) => value,
                Err(err) => {
                    extraction.skip(Self::NAME, source, err.into());
                    continue;
                }
            };

            let mut nodes = Vec::new();
            let mut rejected = Vec::new();
            collect_nodes(value, &mut nodes, &mut rejected);

            for thing in nodes {
                extraction.items.push(Entity::new(Self::NAME, thing, source.clone()));
            }
            for found in rejected {
                extraction.skip(Self::NAME, source.clone(), SkipReason::NotAnObject { found });
            }
        }

        tracing::debug!(
            entities = extraction.items.len(),
            skipped = extraction.skipped.len(),
            "json-ld extraction finished"
        );
        extraction
    }

    fn extract_raw(&self, document: &Document) -> Extraction<Value> {
        let mut extraction = Extraction::new();

        for script in self.scripts(document) {
            let body = self.body(&script);

            match decode_lenient(&body) {
                Ok(value) => extraction.items.push(value),
                Err(reason) => {
                    extraction.skip(Self::NAME, script.outer_html(), reason);
                    extraction.items.push(Value::Object(Map::new()));
                }
            }
        }

        extraction
    }
}

/// Flattens a decoded JSON-LD document into its top-level nodes.
///
/// `@graph` members inherit the wrapper's `@context` unless they declare
/// their own. Other wrapper keys are dropped.
fn collect_nodes(value: Value, nodes: &mut Vec<Thing>, rejected: &mut Vec<&'static str>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_nodes(item, nodes, rejected);
            }
        }
        Value::Object(mut map) => {
            let Some(graph) = map.remove("@graph") else {
                nodes.push(Thing::from(map));
                return;
            };

            let context = map.get("@context");
            let members = match graph {
                Value::Array(members) => members,
                single => vec![single],
            };
            for member in members {
                match member {
                    Value::Object(mut node) => {
                        if let Some(ctx) = context
                            && !node.contains_key("@context")
                        {
                            node.insert("@context".to_string(), ctx.clone());
                        }
                        nodes.push(Thing::from(node));
                    }
                    other => rejected.push(json_kind(&other)),
                }
            }
        }
        other => rejected.push(json_kind(&other)),
    }
}

/// Decodes a script body as a JSON object. A body that is not itself
/// brace-delimited is cut down to the text between its first `{` and its
/// last `}`, so the result is always an object.
fn decode_lenient(body: &str) -> Result<Value, SkipReason> {
    if body.is_empty() {
        return Err(SkipReason::EmptyBody);
    }

    let candidate = if body.starts_with('{') && body.ends_with('}') {
        body
    } else {
        brace_span(body).ok_or_else(|| SkipReason::Unrecoverable {
            message: "body contains no brace-delimited object".to_string(),
        })?
    };

    serde_json::from_str::<Value>(candidate).map_err(|err| SkipReason::Unrecoverable { message: err.to_string() })
}

fn brace_span(body: &str) -> Option<&str> {
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

fn strip_cdata(body: &str) -> &str {
    body.strip_prefix("<![CDATA[")
        .and_then(|inner| inner.strip_suffix("]]>"))
        .map(str::trim)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn entities(html: &str) -> Extraction<Entity> {
        let doc = Document::parse(html).unwrap();
        JsonLdExtractor::new().extract_entities(&doc)
    }

    fn raw(html: &str) -> Extraction<Value> {
        let doc = Document::parse(html).unwrap();
        JsonLdExtractor::new().extract_raw(&doc)
    }

    #[test]
    fn test_single_object() {
        let result = entities(r#"<script type="application/ld+json">{"@type":"Person","name":"Ada"}</script>"#);

        assert_eq!(result.items.len(), 1);
        let entity = &result.items[0];
        assert_eq!(entity.extractor, "json-ld");
        assert_eq!(entity.thing.types(), vec!["Person"]);
        assert_eq!(entity.thing.get("name"), Some(&json!("Ada")));
        assert!(entity.source.starts_with("<script"));
        assert!(entity.source.contains(r#""name":"Ada""#));
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_array_preserves_order() {
        let result = entities(
            r#"<script type="application/ld+json">[{"@type":"A"},{"@type":"B"},{"@type":"C"}]</script>"#,
        );
        let types: Vec<_> = result.items.iter().map(|e| e.thing.types()[0]).collect();
        assert_eq!(types, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_graph_members_inherit_context() {
        let result = entities(
            r#"<script type="application/ld+json">
            {
                "@context": "https://schema.org",
                "@graph": [
                    {"@type": "WebSite", "name": "Site"},
                    {"@type": "Organization", "@context": "https://example.org/ctx"}
                ]
            }
            </script>"#,
        );

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].thing.get("@context"), Some(&json!("https://schema.org")));
        assert_eq!(result.items[1].thing.get("@context"), Some(&json!("https://example.org/ctx")));
        assert!(result.items[0].thing.get("@graph").is_none());
    }

    #[test]
    fn test_graph_with_single_object() {
        let result = entities(r#"<script type="application/ld+json">{"@graph": {"@type": "Event"}}</script>"#);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].thing.types(), vec!["Event"]);
    }

    #[test]
    fn test_documents_order_across_scripts() {
        let result = entities(
            r#"
            <head><script type="application/ld+json">{"@type":"First"}</script></head>
            <body><script type="application/ld+json">[{"@type":"Second"},{"@type":"Third"}]</script></body>
            "#,
        );
        let types: Vec<_> = result.items.iter().map(|e| e.thing.types()[0]).collect();
        assert_eq!(types, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_malformed_script_is_isolated() {
        let result = entities(
            r#"
            <script type="application/ld+json">{"@type": "Broken", </script>
            <script type="application/ld+json">{"@type":"Person","name":"Ada"}</script>
            "#,
        );

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].thing.types(), vec!["Person"]);
        assert_eq!(result.skipped.len(), 1);
        assert!(matches!(result.skipped[0].reason, SkipReason::InvalidJson { .. }));
        assert!(result.skipped[0].source.contains("Broken"));
    }

    #[test]
    fn test_non_object_nodes_are_skipped() {
        let result = entities(r#"<script type="application/ld+json">[{"@type":"Thing"}, "stray", 4]</script>"#);

        assert_eq!(result.items.len(), 1);
        let found: Vec<_> = result
            .skipped
            .iter()
            .map(|s| match &s.reason {
                SkipReason::NotAnObject { found } => *found,
                other => panic!("unexpected reason: {:?}", other),
            })
            .collect();
        assert_eq!(found, vec!["string", "number"]);
    }

    #[test]
    fn test_empty_script_is_skipped() {
        let result = entities(r#"<script type="application/ld+json">   </script>"#);
        assert!(result.items.is_empty());
        assert_eq!(result.skipped[0].reason, SkipReason::EmptyBody);
    }

    #[test]
    fn test_cdata_wrapper_is_stripped() {
        let result =
            entities("<script type=\"application/ld+json\"><![CDATA[ {\"@type\":\"Recipe\"} ]]></script>");
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].thing.types(), vec!["Recipe"]);
    }

    #[rstest]
    #[case("application/ld+json", true)]
    #[case("Application/LD+JSON", true)]
    #[case("  application/ld+json ", true)]
    #[case("vnd.example+application/ld+json", true)]
    #[case("application/json", false)]
    #[case("text/javascript", false)]
    fn test_script_type_selection(#[case] script_type: &str, #[case] selected: bool) {
        let html = format!(r#"<script type="{}">{{"@type":"Thing"}}</script>"#, script_type);
        assert_eq!(entities(&html).items.len(), usize::from(selected));
    }

    #[test]
    fn test_no_scripts_yields_empty() {
        let result = entities("<html><body><p>No data</p></body></html>");
        assert!(result.items.is_empty());
        assert!(result.skipped.is_empty());
        assert!(raw("<p>nothing</p>").items.is_empty());
    }

    #[test]
    fn test_raw_recovers_outermost_braces() {
        let result = raw(r#"<script type="application/ld+json">{"a":1}<!-- junk --></script>"#);
        assert_eq!(result.items, vec![json!({"a": 1})]);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_raw_recovers_leading_junk() {
        let result = raw(r#"<script type="application/ld+json">window.data = {"b": {"c": 2}};</script>"#);
        assert_eq!(result.items, vec![json!({"b": {"c": 2}})]);
    }

    #[test]
    fn test_raw_array_body_falls_back_to_empty_object() {
        let result = raw(r#"<script type="application/ld+json">[{"a":1},{"a":2}]</script>"#);

        assert_eq!(result.items, vec![json!({})]);
        assert!(matches!(result.skipped[0].reason, SkipReason::Unrecoverable { .. }));
    }

    #[test]
    fn test_raw_single_element_array_recovers_its_object() {
        let result = raw(r#"<script type="application/ld+json">[{"@type":"Person","name":"Ada"}]</script>"#);

        assert_eq!(result.items, vec![json!({"@type": "Person", "name": "Ada"})]);
        assert!(result.items.iter().all(Value::is_object));
    }

    #[test]
    fn test_raw_falls_back_to_empty_object() {
        let result = raw(
            r#"
            <script type="application/ld+json">not json at all</script>
            <script type="application/ld+json">{"ok": true}</script>
            <script type="application/ld+json">{ broken }</script>
            "#,
        );

        assert_eq!(result.items, vec![json!({}), json!({"ok": true}), json!({})]);
        assert_eq!(result.skipped.len(), 2);
        assert!(
            result
                .skipped
                .iter()
                .all(|s| matches!(s.reason, SkipReason::Unrecoverable { .. }))
        );
    }

    #[test]
    fn test_brace_span() {
        assert_eq!(brace_span("x{a}y"), Some("{a}"));
        assert_eq!(brace_span("}{"), None);
        assert_eq!(brace_span("none"), None);
    }

    #[test]
    fn test_repeated_extraction_is_identical() {
        let doc = Document::parse(r#"<script type="application/ld+json">{"@type":"Person","name":"Ada"}</script>"#)
            .unwrap();
        let extractor = JsonLdExtractor::new();
        assert_eq!(extractor.extract_entities(&doc), extractor.extract_entities(&doc));
        assert_eq!(extractor.extract_raw(&doc), extractor.extract_raw(&doc));
    }
}

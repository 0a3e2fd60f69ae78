//! Microdata extraction from `itemscope` / `itemtype` / `itemprop` markup.
//!
//! Each top-level item becomes one [`Thing`]. Items that are the value of
//! another item's property are only reachable through that property, so they
//! are never reported twice.
//!
//! Reference: <https://html.spec.whatwg.org/multipage/microdata.html>

use std::collections::HashSet;

use ego_tree::NodeId;
use serde_json::Value;

use crate::parse::Element;
use crate::{Document, Entity, Extraction, Extractor, HarvestConfig, Thing};

/// Extracts Microdata items.
#[derive(Debug, Clone)]
pub struct MicrodataExtractor {
    short_type_names: bool,
    resolve_urls: bool,
}

impl MicrodataExtractor {
    pub const NAME: &'static str = "microdata";

    pub fn new() -> Self {
        Self::with_config(&HarvestConfig::default())
    }

    pub fn with_config(config: &HarvestConfig) -> Self {
        Self { short_type_names: config.short_type_names, resolve_urls: config.resolve_urls }
    }

    /// `itemscope` elements that are not a property value of another item.
    ///
    /// An `itemprop` item is a property value when it sits inside another
    /// item or inside an element some item pulls in through `itemref`.
    fn top_level_items<'a>(&self, document: &'a Document) -> Vec<Element<'a>> {
        let referenced = referenced_nodes(document);
        let items: Vec<_> = document
            .select("[itemscope]")
            .unwrap_or_default()
            .into_iter()
            .filter(|scope| {
                !(scope.has_attr("itemprop")
                    && (referenced.contains(&scope.node_id())
                        || scope
                            .ancestors()
                            .any(|a| a.has_attr("itemscope") || referenced.contains(&a.node_id()))))
            })
            .collect();
        tracing::trace!(count = items.len(), "selected top-level microdata items");
        items
    }

    fn build_item(&self, document: &Document, item: &Element<'_>, path: &mut HashSet<NodeId>) -> Thing {
        let mut thing = Thing::new();
        path.insert(item.node_id());

        if let Some(item_type) = item.attr("itemtype") {
            let types: Vec<Value> = item_type
                .split_ascii_whitespace()
                .map(|t| Value::String(self.type_name(t)))
                .collect();
            match types.len() {
                0 => {}
                1 => {
                    thing.insert("@type", types[0].clone());
                }
                _ => {
                    thing.insert("@type", Value::Array(types));
                }
            }
        }

        if let Some(item_id) = item.attr("itemid").map(str::trim).filter(|id| !id.is_empty()) {
            thing.insert("@id", Value::String(self.url(document, item_id)));
        }

        for child in item.children() {
            self.walk(document, child, &mut thing, path);
        }

        for referenced in self.referenced_elements(document, item) {
            self.walk(document, referenced, &mut thing, path);
        }

        path.remove(&item.node_id());
        thing
    }

    /// Elements named by `itemref`, excluding the item itself and anything
    /// already inside it.
    fn referenced_elements<'a>(&self, document: &'a Document, item: &Element<'_>) -> Vec<Element<'a>> {
        let Some(refs) = item.attr("itemref") else {
            return Vec::new();
        };

        let item_id = item.node_id();
        refs.split_ascii_whitespace()
            .filter_map(|id| document.element_by_id(id))
            .filter(|el| el.node_id() != item_id && !el.ancestors().any(|a| a.node_id() == item_id))
            .collect()
    }

    fn walk(&self, document: &Document, element: Element<'_>, thing: &mut Thing, path: &mut HashSet<NodeId>) {
        let is_scope = element.has_attr("itemscope");

        if let Some(names) = element.attr("itemprop") {
            let value = if is_scope {
                // an item already being built further up would recurse forever
                (!path.contains(&element.node_id()))
                    .then(|| self.build_item(document, &element, path).into_value())
            } else {
                self.property_value(document, &element)
            };

            if let Some(value) = value {
                for name in names.split_ascii_whitespace() {
                    thing.append(name, value.clone());
                }
            }
        }

        if is_scope {
            return;
        }

        for child in element.children() {
            self.walk(document, child, thing, path);
        }
    }

    /// The value of a non-item property, by element kind.
    ///
    /// Returns `None` when the element lacks the attribute that carries its
    /// value.
    fn property_value(&self, document: &Document, element: &Element<'_>) -> Option<Value> {
        let value = match element.tag_name().as_str() {
            "meta" => element.attr("content")?.to_string(),
            "audio" | "embed" | "iframe" | "img" | "source" | "track" | "video" => {
                self.url_attr(document, element, "src")?
            }
            "a" | "area" | "link" => self.url_attr(document, element, "href")?,
            "object" => self.url_attr(document, element, "data")?,
            "data" | "meter" => element.attr("value")?.to_string(),
            "time" => match element.attr("datetime") {
                Some(datetime) => datetime.trim().to_string(),
                None => element.normalized_text(),
            },
            _ => element.normalized_text(),
        };
        Some(Value::String(value))
    }

    fn url_attr(&self, document: &Document, element: &Element<'_>, name: &str) -> Option<String> {
        let href = element.attr(name)?.trim();
        (!href.is_empty()).then(|| self.url(document, href))
    }

    fn url(&self, document: &Document, href: &str) -> String {
        if self.resolve_urls { document.resolve_url(href) } else { href.to_string() }
    }

    fn type_name(&self, item_type: &str) -> String {
        if !self.short_type_names {
            return item_type.to_string();
        }
        item_type
            .rsplit(['/', '#'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(item_type)
            .to_string()
    }
}

/// Nodes named by any item's `itemref`.
fn referenced_nodes(document: &Document) -> HashSet<NodeId> {
    document
        .select("[itemscope][itemref]")
        .unwrap_or_default()
        .iter()
        .filter_map(|item| item.attr("itemref"))
        .flat_map(str::split_ascii_whitespace)
        .filter_map(|id| document.element_by_id(id))
        .map(|el| el.node_id())
        .collect()
}

impl Default for MicrodataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for MicrodataExtractor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extract_entities(&self, document: &Document) -> Extraction<Entity> {
        let mut extraction = Extraction::new();
        let mut path = HashSet::new();

        for item in self.top_level_items(document) {
            let thing = self.build_item(document, &item, &mut path);
            extraction.items.push(Entity::new(Self::NAME, thing, item.outer_html()));
        }

        tracing::debug!(entities = extraction.items.len(), "microdata extraction finished");
        extraction
    }

    fn extract_raw(&self, document: &Document) -> Extraction<Value> {
        let mut extraction = Extraction::new();
        let mut path = HashSet::new();

        for item in self.top_level_items(document) {
            extraction.items.push(self.build_item(document, &item, &mut path).into_value());
        }

        extraction
    }
}

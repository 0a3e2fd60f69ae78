//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types the extractors
//! query. Parsing is delegated to `scraper`; these wrappers add the small set
//! of tree operations structured data extraction needs: attribute checks,
//! element children, ancestors and id lookup.
//!
//! # Example
//!
//! ```rust
//! use harvest_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><meta property="og:title" content="Title"></head>
//!         <body><p class="content">Paragraph</p></body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let metas = doc.select("meta[property]").unwrap();
//! assert_eq!(metas[0].attr("content"), Some("Title"));
//! ```

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{HarvestError, Result};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and the URL it was loaded from, if known.
/// It is never modified after parsing, so repeated extraction over the same
/// Document always sees the same tree.
///
/// # Example
///
/// ```rust
/// use harvest_core::parse::Document;
///
/// let html = r#"<html><head><base href="https://example.com/"></head><body><p>Hello</p></body></html>"#;
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.resolve_url("about"), "https://example.com/about");
/// ```
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// HTML parsing is error tolerant, so any string yields a document. An
    /// absolute `<base href>` becomes the base URL; a relative one is ignored.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        let mut doc = Self { html, base_url: None };
        doc.base_url = doc.declared_base(None);
        Ok(doc)
    }

    /// Parses HTML from a string with a known base URL.
    ///
    /// The base URL is used to resolve relative links in URL-valued
    /// properties. A `<base href>` element in the document takes precedence
    /// when it can be resolved.
    ///
    /// # Example
    ///
    /// ```rust
    /// use harvest_core::parse::Document;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://example.com/articles/").unwrap();
    /// let doc = Document::parse_with_url("<a href='one'>1</a>", base).unwrap();
    /// assert_eq!(doc.resolve_url("one"), "https://example.com/articles/one");
    /// ```
    pub fn parse_with_url(html: &str, base_url: Url) -> Result<Self> {
        let mut doc = Self::parse(html)?;
        doc.base_url = Some(doc.declared_base(Some(&base_url)).unwrap_or(base_url));
        Ok(doc)
    }

    /// The first `<base href>`, joined onto `fallback` when one is given.
    fn declared_base(&self, fallback: Option<&Url>) -> Option<Url> {
        let bases = self.select("base[href]").ok()?;
        let href = bases.first()?.attr("href")?.trim();
        match fallback {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        }
    }

    /// Gets the base URL used for resolving relative links.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use harvest_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Finds the first element whose `id` attribute equals `id`.
    ///
    /// Compares attribute values directly, so ids that are not valid CSS
    /// identifiers still match.
    pub fn element_by_id(&'_ self, id: &str) -> Option<Element<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().id() == Some(id))
            .map(|element| Element { element })
    }

    /// Resolves `href` against the base URL.
    ///
    /// Returns `href` unchanged when there is no base URL or it cannot be
    /// joined.
    pub fn resolve_url(&self, href: &str) -> String {
        match &self.base_url {
            Some(base) => base.join(href).map(String::from).unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        }
    }
}

/// A wrapper around scraper's ElementRef.
///
/// Element represents a single node in the HTML document tree and provides
/// methods for accessing its attributes, text content, and relatives.
///
/// # Example
///
/// ```rust
/// use harvest_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the outer HTML of this element, including its own tags.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all text nodes within this element. For
    /// `script` elements this is the raw script body.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text content with runs of whitespace collapsed to a single
    /// space and the ends trimmed.
    pub fn normalized_text(&self) -> String {
        WHITESPACE.replace_all(self.text().trim(), " ").into_owned()
    }

    /// Gets the value of an attribute.
    ///
    /// Returns `None` if the attribute is not present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Returns true if the attribute is present, even with an empty value.
    pub fn has_attr(&self, name: &str) -> bool {
        self.element.value().attr(name).is_some()
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Iterates over the direct element children, in document order.
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.children().filter_map(ElementRef::wrap).map(|element| Element { element })
    }

    /// Iterates over the element ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.ancestors().filter_map(ElementRef::wrap).map(|element| Element { element })
    }

    /// A key that identifies this node within its document.
    pub fn node_id(&self) -> ego_tree::NodeId {
        self.element.id()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::HtmlParseError(format!("Invalid selector: {}", e)))
}

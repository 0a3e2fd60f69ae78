//! Main structured data extraction API.
//!
//! The [`Harvester`] runs an ordered list of [`Extractor`]s over one parsed
//! [`Document`] and concatenates their results. Convenience functions such
//! as [`extract_entities`] cover the common case of a default harvester over
//! an HTML string.
//!
//! # Example
//!
//! ```rust
//! use harvest_core::{Harvester, extract_entities};
//!
//! let html = r#"<script type="application/ld+json">{"@type":"Person","name":"Ada"}</script>"#;
//! let entities = extract_entities(html).unwrap();
//! assert_eq!(entities[0].thing.types(), vec!["Person"]);
//!
//! // Or fetch and extract in one step
//! # #[cfg(feature = "fetch")]
//! # async fn example() -> harvest_core::Result<()> {
//! let harvester = Harvester::new();
//! let entities = harvester.fetch_entities("https://example.com", &Default::default()).await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
#[cfg(feature = "fetch")]
use url::Url;

#[cfg(feature = "fetch")]
use crate::fetch::{FetchConfig, fetch_url};
use crate::fetch::fetch_file;
use crate::{
    Document, Entity, Extraction, Extractor, JsonLdExtractor, MetaExtractor, MetaStatements, MicrodataExtractor,
    Result, Skipped,
};
#[cfg(feature = "fetch")]
use crate::HarvestError;

/// Configuration for the built-in extractors.
///
/// # Example
///
/// ```rust
/// use harvest_core::HarvestConfig;
///
/// let config = HarvestConfig::builder()
///     .short_type_names(true)
///     .resolve_urls(false)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Shorten Microdata `itemtype` URLs to their last segment, so
    /// `https://schema.org/Person` becomes `Person` (default: false).
    pub short_type_names: bool,

    /// Resolve relative URL-valued Microdata properties against the
    /// document base URL (default: true).
    pub resolve_urls: bool,

    /// Strip a `<![CDATA[ ... ]]>` wrapper around JSON-LD script bodies
    /// (default: true).
    pub strip_cdata: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self { short_type_names: false, resolve_urls: true, strip_cdata: true }
    }
}

impl HarvestConfig {
    /// Creates a new builder for HarvestConfig.
    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder::new()
    }
}

/// Builder for HarvestConfig.
pub struct HarvestConfigBuilder {
    config: HarvestConfig,
}

impl HarvestConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: HarvestConfig::default() }
    }

    /// Sets whether Microdata type URLs are shortened.
    pub fn short_type_names(mut self, value: bool) -> Self {
        self.config.short_type_names = value;
        self
    }

    /// Sets whether relative Microdata URLs are resolved.
    pub fn resolve_urls(mut self, value: bool) -> Self {
        self.config.resolve_urls = value;
        self
    }

    /// Sets whether CDATA wrappers are stripped from JSON-LD bodies.
    pub fn strip_cdata(mut self, value: bool) -> Self {
        self.config.strip_cdata = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> HarvestConfig {
        self.config
    }
}

impl Default for HarvestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything harvested from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Harvest {
    /// Entities from every extractor, extractor order first.
    pub entities: Vec<Entity>,
    /// Meta tag statements.
    pub meta: MetaStatements,
    /// Candidates the extractors could not decode.
    pub skipped: Vec<Skipped>,
}

/// Runs the configured extractors over a document.
///
/// The extractor list is fixed at construction. A Harvester holds no
/// per-call state and can be shared between threads.
///
/// # Example
///
/// ```rust
/// use harvest_core::{Document, Harvester};
///
/// let harvester = Harvester::new();
/// let doc = Document::parse(r#"
///     <meta property="og:title" content="Hello">
///     <div itemscope itemtype="https://schema.org/Person"><span itemprop="name">Ada</span></div>
/// "#).unwrap();
///
/// assert_eq!(harvester.extract_entities(&doc).len(), 1);
/// assert_eq!(harvester.extract_meta(&doc).first("og:title"), Some("Hello"));
/// ```
pub struct Harvester {
    extractors: Vec<Box<dyn Extractor>>,
    meta: MetaExtractor,
}

impl Harvester {
    /// Creates a harvester running JSON-LD then Microdata with default settings.
    pub fn new() -> Self {
        Self::with_config(HarvestConfig::default())
    }

    /// Creates a harvester running JSON-LD then Microdata with `config`.
    pub fn with_config(config: HarvestConfig) -> Self {
        let extractors: Vec<Box<dyn Extractor>> = vec![
            Box::new(JsonLdExtractor::with_config(&config)),
            Box::new(MicrodataExtractor::with_config(&config)),
        ];
        Self::with_extractors(extractors)
    }

    /// Creates a harvester over a custom, ordered extractor list.
    pub fn with_extractors(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self { extractors, meta: MetaExtractor::new() }
    }

    /// Names of the extractors, in the order they run.
    pub fn extractor_names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Entities from every extractor, with skip records.
    pub fn extract_entities_report(&self, document: &Document) -> Extraction<Entity> {
        let mut extraction = Extraction::new();
        for extractor in &self.extractors {
            extraction.merge(extractor.extract_entities(document));
        }
        extraction
    }

    /// Entities from every extractor, in extractor order then document order.
    pub fn extract_entities(&self, document: &Document) -> Vec<Entity> {
        self.extract_entities_report(document).into_items()
    }

    /// Raw payloads from every extractor, with skip records.
    pub fn extract_raw_report(&self, document: &Document) -> Extraction<Value> {
        let mut extraction = Extraction::new();
        for extractor in &self.extractors {
            extraction.merge(extractor.extract_raw(document));
        }
        extraction
    }

    /// Loosely typed JSON payloads from every extractor.
    pub fn extract_raw(&self, document: &Document) -> Vec<Value> {
        self.extract_raw_report(document).into_items()
    }

    /// Meta tag statements.
    pub fn extract_meta(&self, document: &Document) -> MetaStatements {
        self.meta.extract(document)
    }

    /// Entities, meta statements and skip records in one pass.
    pub fn harvest(&self, document: &Document) -> Harvest {
        let Extraction { items, skipped } = self.extract_entities_report(document);
        Harvest { entities: items, meta: self.extract_meta(document), skipped }
    }

    pub fn entities_from_html(&self, html: &str) -> Result<Vec<Entity>> {
        Ok(self.extract_entities(&Document::parse(html)?))
    }

    pub fn raw_from_html(&self, html: &str) -> Result<Vec<Value>> {
        Ok(self.extract_raw(&Document::parse(html)?))
    }

    pub fn meta_from_html(&self, html: &str) -> Result<MetaStatements> {
        Ok(self.extract_meta(&Document::parse(html)?))
    }

    /// Reads a UTF-8 file and extracts its entities.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::FileNotFound`](crate::HarvestError::FileNotFound),
    /// [`HarvestError::InvalidEncoding`](crate::HarvestError::InvalidEncoding) or
    /// an I/O error before any extractor runs.
    pub fn entities_from_file(&self, path: impl AsRef<Path>) -> Result<Vec<Entity>> {
        self.entities_from_html(&fetch_file(path)?)
    }

    pub fn raw_from_file(&self, path: impl AsRef<Path>) -> Result<Vec<Value>> {
        self.raw_from_html(&fetch_file(path)?)
    }

    pub fn meta_from_file(&self, path: impl AsRef<Path>) -> Result<MetaStatements> {
        self.meta_from_html(&fetch_file(path)?)
    }

    /// Fetches `url` under `fetch_config.timeout` and parses it with the URL
    /// as base.
    #[cfg(feature = "fetch")]
    pub async fn fetch_document(&self, url: &str, fetch_config: &FetchConfig) -> Result<Document> {
        let base_url = Url::parse(url).map_err(|e| HarvestError::InvalidUrl(e.to_string()))?;
        let html = fetch_url(url, fetch_config).await?;
        Document::parse_with_url(&html, base_url)
    }

    /// Fetches `url` and extracts its entities.
    #[cfg(feature = "fetch")]
    pub async fn fetch_entities(&self, url: &str, fetch_config: &FetchConfig) -> Result<Vec<Entity>> {
        let document = self.fetch_document(url, fetch_config).await?;
        Ok(self.extract_entities(&document))
    }

    /// Fetches `url` and extracts raw payloads.
    #[cfg(feature = "fetch")]
    pub async fn fetch_raw(&self, url: &str, fetch_config: &FetchConfig) -> Result<Vec<Value>> {
        let document = self.fetch_document(url, fetch_config).await?;
        Ok(self.extract_raw(&document))
    }

    /// Fetches `url` and extracts its meta statements.
    #[cfg(feature = "fetch")]
    pub async fn fetch_meta(&self, url: &str, fetch_config: &FetchConfig) -> Result<MetaStatements> {
        let document = self.fetch_document(url, fetch_config).await?;
        Ok(self.extract_meta(&document))
    }
}

impl Default for Harvester {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function: entities of an HTML string with defaults.
pub fn extract_entities(html: &str) -> Result<Vec<Entity>> {
    Harvester::new().entities_from_html(html)
}

/// Convenience function: raw payloads of an HTML string with defaults.
pub fn extract_raw(html: &str) -> Result<Vec<Value>> {
    Harvester::new().raw_from_html(html)
}

/// Convenience function: meta statements of an HTML string.
pub fn extract_meta(html: &str) -> Result<MetaStatements> {
    Harvester::new().meta_from_html(html)
}

/// Convenience function: fetch a URL and extract its entities with defaults.
#[cfg(feature = "fetch")]
pub async fn fetch_and_extract(url: &str) -> Result<Vec<Entity>> {
    Harvester::new().fetch_entities(url, &FetchConfig::default()).await
}

/// Fetch a URL under a custom fetch config and extract its entities.
#[cfg(feature = "fetch")]
pub async fn fetch_and_extract_with_config(url: &str, fetch_config: &FetchConfig) -> Result<Vec<Entity>> {
    Harvester::new().fetch_entities(url, fetch_config).await
}

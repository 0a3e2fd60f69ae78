//! Structured data extraction from HTML documents.
//!
//! Decodes JSON-LD scripts, Microdata markup and meta tags into uniform
//! records. A [`Harvester`] runs the extractors over a parsed [`Document`];
//! the free functions cover the one-shot case.
//!
//! ```rust
//! use harvest_core::{extract_entities, extract_meta};
//!
//! let html = r#"
//!     <meta property="og:image" content="a.jpg">
//!     <script type="application/ld+json">{"@type":"Person","name":"Ada"}</script>
//! "#;
//!
//! let entities = extract_entities(html).unwrap();
//! assert_eq!(entities[0].thing.get("name").and_then(|v| v.as_str()), Some("Ada"));
//!
//! let meta = extract_meta(html).unwrap();
//! assert_eq!(meta.first("og:image"), Some("a.jpg"));
//! ```

pub mod error;
pub mod extractor;
pub mod fetch;
pub mod harvester;
pub mod jsonld;
pub mod meta;
pub mod microdata;
pub mod parse;
pub mod thing;

pub use error::{HarvestError, Result};
pub use extractor::{Extraction, Extractor, SkipReason, Skipped};
pub use fetch::FetchConfig;
pub use fetch::{fetch_file, fetch_stdin};
#[cfg(feature = "fetch")]
pub use fetch::fetch_url;
pub use harvester::{Harvest, HarvestConfig, HarvestConfigBuilder, Harvester, extract_entities, extract_meta, extract_raw};
#[cfg(feature = "fetch")]
pub use harvester::{fetch_and_extract, fetch_and_extract_with_config};
pub use jsonld::JsonLdExtractor;
pub use meta::{MetaExtractor, MetaStatement, MetaStatements};
pub use microdata::MicrodataExtractor;
pub use parse::Document;
pub use thing::{Entity, Thing};

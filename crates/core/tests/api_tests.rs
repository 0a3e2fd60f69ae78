//! Library API integration tests
use harvest_core::*;
use serde_json::json;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

#[test]
fn test_extract_entities_api() {
    let entities = extract_entities(&read_fixture("product.html")).expect("should extract");

    let summary: Vec<_> = entities.iter().map(|e| (e.extractor, e.thing.types()[0])).collect();
    assert_eq!(
        summary,
        vec![
            ("json-ld", "Organization"),
            ("json-ld", "WebSite"),
            ("json-ld", "BreadcrumbList"),
            ("microdata", "https://schema.org/Product"),
        ]
    );
    assert!(entities.iter().all(|e| !e.source.is_empty()));
}

#[test]
fn test_graph_nodes_share_source_and_context() {
    let entities = extract_entities(&read_fixture("product.html")).unwrap();

    assert_eq!(entities[0].source, entities[1].source);
    assert_eq!(entities[0].thing.id(), Some("https://store.example.com/#org"));
    assert_eq!(entities[1].thing.get("@context"), Some(&json!("https://schema.org")));
}

#[test]
fn test_microdata_product_tree() {
    let entities = extract_entities(&read_fixture("product.html")).unwrap();
    let product = &entities[3].thing;

    assert_eq!(product.get("name"), Some(&json!("Acme Anvil")));
    assert_eq!(product.get("description"), Some(&json!("A sturdy anvil for every workshop.")));
    assert_eq!(product.get("image"), Some(&json!("/img/anvil-front.jpg")));
    assert_eq!(
        product.get("offers"),
        Some(&json!({
            "@type": "https://schema.org/Offer",
            "priceCurrency": "USD",
            "price": "149.00",
            "availability": "https://schema.org/InStock"
        }))
    );
    assert_eq!(
        product.get("review").and_then(|r| r.get("reviewRating")),
        Some(&json!({"@type": "https://schema.org/Rating", "ratingValue": "2"}))
    );
}

#[test]
fn test_extract_meta_api() {
    let meta = extract_meta(&read_fixture("product.html")).expect("should extract");

    assert_eq!(
        meta.keys().collect::<Vec<_>>(),
        vec!["og:description", "description", "og:title", "og:image", "twitter:card"]
    );
    assert_eq!(
        meta.get("og:image"),
        Some(
            &[
                "https://store.example.com/img/anvil-front.jpg".to_string(),
                "https://store.example.com/img/anvil-side.jpg".to_string(),
            ][..]
        )
    );
}

#[test]
fn test_extract_raw_api() {
    let raw = extract_raw(&read_fixture("product.html")).expect("should extract");

    assert_eq!(raw.len(), 3);
    assert!(raw[0].get("@graph").is_some());
    assert_eq!(raw[1]["@type"], "BreadcrumbList");
    assert_eq!(raw[2]["@type"], "https://schema.org/Product");
}

#[test]
fn test_fault_isolation() {
    let doc = Document::parse(&read_fixture("malformed.html")).unwrap();
    let harvester = Harvester::new();

    let report = harvester.extract_entities_report(&doc);
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].thing.get("headline"), Some(&json!("Working block")));
    assert_eq!(report.skipped.len(), 2);
    assert!(report.skipped[0].source.contains("Broken block"));

    let raw = harvester.extract_raw(&doc);
    assert_eq!(raw[0], json!({}));
    assert_eq!(raw[1]["headline"], "Working block");
    assert_eq!(raw[2], json!({"@type": "Event", "name": "Launch"}));
}

#[test]
fn test_plain_document_is_empty() {
    let html = read_fixture("plain.html");

    assert!(extract_entities(&html).unwrap().is_empty());
    assert!(extract_raw(&html).unwrap().is_empty());
    assert!(extract_meta(&html).unwrap().is_empty());
}

#[test]
fn test_extraction_is_idempotent() {
    let doc = Document::parse(&read_fixture("product.html")).unwrap();
    let harvester = Harvester::new();

    assert_eq!(harvester.harvest(&doc), harvester.harvest(&doc));
    assert_eq!(harvester.extract_raw(&doc), harvester.extract_raw(&doc));
}

#[test]
fn test_from_file() {
    let harvester = Harvester::new();

    let entities = harvester.entities_from_file(get_fixture_path("product.html")).unwrap();
    assert_eq!(entities.len(), 4);

    let meta = harvester.meta_from_file(get_fixture_path("product.html")).unwrap();
    assert_eq!(meta.first("og:title"), Some("Acme Anvil"));

    let raw = harvester.raw_from_file(get_fixture_path("malformed.html")).unwrap();
    assert_eq!(raw.len(), 3);
}

#[test]
fn test_missing_file_is_hard_failure() {
    let result = Harvester::new().entities_from_file(get_fixture_path("does_not_exist.html"));
    assert!(matches!(result, Err(HarvestError::FileNotFound(_))));
}

#[test]
fn test_config_changes_microdata_output() {
    let html = read_fixture("product.html");
    let base = url::Url::parse("https://store.example.com/anvils/acme").unwrap();
    let doc = Document::parse_with_url(&html, base).unwrap();

    let harvester = Harvester::with_config(HarvestConfig::builder().short_type_names(true).build());
    let product = harvester.extract_entities(&doc).pop().unwrap().thing;

    assert_eq!(product.types(), vec!["Product"]);
    assert_eq!(product.get("image"), Some(&json!("https://store.example.com/img/anvil-front.jpg")));
    assert_eq!(product.get("offers").and_then(|o| o.get("@type")), Some(&json!("Offer")));
}

#[test]
fn test_harvest_serializes() {
    let doc = Document::parse(&read_fixture("malformed.html")).unwrap();
    let harvest = Harvester::new().harvest(&doc);
    let value = serde_json::to_value(&harvest).unwrap();

    assert_eq!(value["entities"][0]["extractor"], "json-ld");
    assert_eq!(value["skipped"][0]["reason"]["kind"], "invalid_json");
    assert_eq!(value["skipped"][1]["reason"]["kind"], "invalid_json");
    assert!(value["meta"].as_object().unwrap().is_empty());
}

#[cfg(feature = "fetch")]
#[tokio::test]
async fn test_fetch_invalid_url_is_hard_failure() {
    let result = Harvester::new().fetch_entities("not a url", &FetchConfig::default()).await;
    assert!(matches!(result, Err(HarvestError::InvalidUrl(_))));
}

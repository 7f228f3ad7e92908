use super::*;

fn doc(xml: &str) -> Result<FeedDocument, FeedError> {
    Ok(FeedDocument::parse(xml.as_bytes()).unwrap())
}

fn offer_xml(id: &str, vendor_code: Option<&str>) -> String {
    let vendor = vendor_code
        .map(|c| format!("<vendorCode>{c}</vendorCode>"))
        .unwrap_or_default();
    format!(
        r#"<offer id="{id}" available="true"><name>Item {id}</name><price>10.00</price><categoryId>1</categoryId>{vendor}</offer>"#
    )
}

fn catalog(offers: &[String]) -> String {
    format!(
        "<yml_catalog><shop><offers>{}</offers></shop></yml_catalog>",
        offers.concat()
    )
}

fn merger() -> OfferMerger {
    OfferMerger::new(AvailabilityPolicy::RequireTrue, DedupKey::VendorCode)
}

fn ids(catalog: &MergedCatalog) -> Vec<&str> {
    catalog.offers.iter().map(|o| o.id.as_str()).collect()
}

#[test]
fn offers_follow_feed_order_then_document_order() {
    let mut merger = merger();
    merger.ingest(
        "2",
        doc(&catalog(&[offer_xml("b1", None), offer_xml("b2", None)])),
    );
    merger.ingest("1", doc(&catalog(&[offer_xml("a1", None)])));
    let merged = merger.finish();
    assert_eq!(ids(&merged), vec!["b1", "b2", "a1"]);
}

#[test]
fn failed_feed_contributes_nothing_and_run_continues() {
    let mut merger = merger();
    let report = merger.ingest(
        "1001",
        Err(FeedError::UnexpectedStatus {
            status: 500,
            url: "http://feeds.test/1001.xml".to_string(),
        }),
    );
    assert!(matches!(report.status, FeedStatus::Failed { ref error } if error.contains("500")));
    assert_eq!(report.accepted(), 0);

    let offers: Vec<String> = (1..=5).map(|i| offer_xml(&format!("o{i}"), None)).collect();
    let report = merger.ingest("1002", doc(&catalog(&offers)));
    assert_eq!(report.accepted(), 5);

    let merged = merger.finish();
    assert_eq!(merged.offers.len(), 5);
    assert_eq!(merged.failed_feeds(), 1);
    assert_eq!(merged.reports.len(), 2);
}

#[test]
fn duplicates_across_feeds_keep_first_occurrence() {
    let mut merger = merger();
    merger.ingest("1", doc(&catalog(&[offer_xml("first", Some("X001"))])));
    let report = merger.ingest(
        "2",
        doc(&catalog(&[
            offer_xml("second", Some("X001")),
            offer_xml("third", Some("X002")),
        ])),
    );
    assert_eq!(
        report.status,
        FeedStatus::Merged {
            strategy: Some(ExtractionStrategy::ShopOffers),
            extracted: 2,
            accepted: 1,
            rejected: 0,
            duplicates: 1,
        }
    );
    let merged = merger.finish();
    assert_eq!(ids(&merged), vec!["first", "third"]);
    assert_eq!(merged.duplicates, 1);
}

#[test]
fn rejected_offers_are_counted_and_skipped() {
    let mut merger = merger();
    let bad = r#"<offer id="bad"><name></name><price>1</price><categoryId>1</categoryId></offer>"#;
    let report = merger.ingest(
        "1",
        doc(&catalog(&[
            offer_xml("good", None),
            bad.to_string(),
            "<offer><name>x</name></offer>".to_string(),
        ])),
    );
    assert!(matches!(
        report.status,
        FeedStatus::Merged {
            extracted: 3,
            accepted: 1,
            rejected: 2,
            ..
        }
    ));
    let merged = merger.finish();
    assert_eq!(ids(&merged), vec!["good"]);
    assert_eq!(merged.rejected(), 2);
}

#[test]
fn document_without_offers_is_an_empty_merge() {
    let mut merger = merger();
    let report = merger.ingest("1", doc("<yml_catalog><shop/></yml_catalog>"));
    assert_eq!(
        report.status,
        FeedStatus::Merged {
            strategy: None,
            extracted: 0,
            accepted: 0,
            rejected: 0,
            duplicates: 0,
        }
    );
    assert!(merger.is_empty());
}

#[test]
fn end_to_end_fixture_yields_single_offer() {
    // A valid offer, a nameless one with an empty price, and a repeat of A's
    // vendor code.
    let feed = r#"<yml_catalog><shop><offers>
        <offer id="A" available="true"><name>Widget</name><price>19.99</price><categoryId>10</categoryId><vendorCode>X001</vendorCode></offer>
        <offer id="B" available="true"><name></name><price></price><categoryId>10</categoryId></offer>
        <offer id="A" available="true"><name>Widget copy</name><price>19.99</price><categoryId>10</categoryId><vendorCode>X001</vendorCode></offer>
    </offers></shop></yml_catalog>"#;
    let mut merger = merger();
    merger.ingest("1001", doc(feed));
    let merged = merger.finish();
    assert_eq!(merged.offers.len(), 1);
    assert_eq!(merged.offers[0].id, "A");
    assert_eq!(merged.offers[0].name, "Widget");
    assert_eq!(merged.rejected(), 1);
    assert_eq!(merged.duplicates, 1);
}

//! Integration tests for `FeedClient`.
//!
//! Remote fetches run against a local `wiremock` server; local-directory
//! fetches run against a temporary directory.

use promfeed_core::FeedSourceConfig;
use promfeed_ingest::{FeedClient, FeedError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<yml_catalog date="2024-05-01 10:00">
  <shop>
    <offers>
      <offer id="A" available="true">
        <name>Widget</name>
        <price>19.99</price>
        <categoryId>10</categoryId>
      </offer>
    </offers>
  </shop>
</yml_catalog>"#;

fn remote_client(server: &MockServer, max_retries: u32) -> FeedClient {
    FeedClient::new(
        FeedSourceConfig::Remote {
            base_url: format!("{}/api/feeds", server.uri()),
        },
        5,
        "promfeed-test/0.1",
        max_retries,
        0,
    )
    .expect("failed to build test FeedClient")
}

fn local_client(dir: &std::path::Path) -> FeedClient {
    FeedClient::new(
        FeedSourceConfig::Local {
            dir: dir.to_path_buf(),
        },
        5,
        "promfeed-test/0.1",
        0,
        0,
    )
    .expect("failed to build test FeedClient")
}

// ---------------------------------------------------------------------------
// remote source
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_document_parses_remote_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feeds/1849.xml"))
        .and(header("user-agent", "promfeed-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_XML))
        .expect(1)
        .mount(&server)
        .await;

    let doc = remote_client(&server, 0)
        .fetch_document("1849")
        .await
        .expect("expected feed to parse");

    assert_eq!(doc.root().name, "yml_catalog");
}

#[tokio::test]
async fn server_error_is_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feeds/1001.xml"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = remote_client(&server, 3)
        .fetch_document("1001")
        .await
        .unwrap_err();

    assert!(
        matches!(err, FeedError::UnexpectedStatus { status: 500, .. }),
        "expected UnexpectedStatus(500), got: {err:?}"
    );
}

#[tokio::test]
async fn missing_remote_feed_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feeds/404.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = remote_client(&server, 0)
        .fetch_document("404")
        .await
        .unwrap_err();

    assert!(
        matches!(err, FeedError::NotFound { ref location } if location.ends_with("/api/feeds/404.xml")),
        "expected NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn rate_limited_request_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feeds/7.xml"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/feeds/7.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_XML))
        .expect(1)
        .mount(&server)
        .await;

    let result = remote_client(&server, 1).fetch_document("7").await;

    assert!(result.is_ok(), "expected Ok after retry, got: {result:?}");
}

#[tokio::test]
async fn malformed_body_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feeds/9.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<yml_catalog><shop></yml_catalog>"))
        .mount(&server)
        .await;

    let err = remote_client(&server, 0)
        .fetch_document("9")
        .await
        .unwrap_err();

    assert!(
        matches!(err, FeedError::Xml(_) | FeedError::Malformed { .. }),
        "expected XML failure, got: {err:?}"
    );
}

#[tokio::test]
async fn remote_bytes_are_cached_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feeds/1850.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_XML))
        .mount(&server)
        .await;
    let cache = tempfile::tempdir().unwrap();
    let cache_dir = cache.path().join("raw");

    remote_client(&server, 0)
        .with_cache_dir(cache_dir.clone())
        .fetch_bytes("1850")
        .await
        .expect("expected fetch to succeed");

    let cached = std::fs::read_to_string(cache_dir.join("raw_feed_1850.xml")).unwrap();
    assert_eq!(cached, FEED_XML);
}

// ---------------------------------------------------------------------------
// local source
// ---------------------------------------------------------------------------

#[tokio::test]
async fn local_feed_is_read_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("1849.xml"), FEED_XML).unwrap();

    let doc = local_client(dir.path())
        .fetch_document("1849")
        .await
        .expect("expected local feed to parse");

    assert_eq!(doc.root().name, "yml_catalog");
}

#[tokio::test]
async fn missing_local_feed_is_not_found() {
    let dir = tempfile::tempdir().unwrap();

    let err = local_client(dir.path())
        .fetch_document("1849")
        .await
        .unwrap_err();

    assert!(
        matches!(err, FeedError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

//! Configuration and client tests.
//!
//! Exercises credential handling, request headers, paging and status mapping against a mock
//! server.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use zotero_mcp::client::{ItemQuery, ZoteroClient};
use zotero_mcp::config::{Config, LibraryType};
use zotero_mcp::error::{ClientError, ConfigError};

fn item(key: &str) -> serde_json::Value {
    json!({"key": key, "version": 1, "data": {"itemType": "book", "title": key}})
}

/// Local-mode config pointed at a mock server.
fn local_config(uri: &str) -> Config {
    let mut config = Config::new(None, LibraryType::User, Some("ignored".into()), true);
    config.api_base_url = uri.to_string();
    config.max_retries = 0;
    config
}

// =============================================================================
// Client construction
// =============================================================================

#[test]
fn test_client_requires_credentials_in_remote_mode() {
    let config = Config::new(Some("1".into()), LibraryType::User, None, false);
    let err = ZoteroClient::from_config(&config).unwrap_err();
    assert!(matches!(err, ClientError::Config(ConfigError::MissingCredentials)));
}

#[test]
fn test_client_local_mode_needs_no_credentials() {
    let client = ZoteroClient::from_config(&Config::default()).unwrap();
    assert!(client.is_local());
    assert!(!client.has_api_key());
    assert_eq!(client.library_url(), "http://localhost:23119/api/users/0");
}

#[test]
fn test_client_rejects_unsendable_api_key() {
    let config = Config::new(Some("1".into()), LibraryType::User, Some("bad\nkey".into()), false);
    let err = ZoteroClient::from_config(&config).unwrap_err();
    assert!(matches!(err, ClientError::Config(ConfigError::InvalidApiKey)));
}

#[test]
fn test_client_debug_hides_key() {
    let client = ZoteroClient::from_config(&Config::for_testing("http://127.0.0.1:1")).unwrap();
    let debug = format!("{client:?}");
    assert!(!debug.contains("test-key"));
    assert!(debug.contains("/users/12345"));
}

#[test]
fn test_group_library_url_is_used() {
    let mut config = Config::for_testing("http://127.0.0.1:1");
    config.library_type = LibraryType::Group;
    let client = ZoteroClient::from_config(&config).unwrap();
    assert_eq!(client.library_url(), "http://127.0.0.1:1/groups/12345");
}

// =============================================================================
// Headers
// =============================================================================

#[tokio::test]
async fn test_remote_requests_carry_version_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/12345/items/K1"))
        .and(header("Zotero-API-Version", "3"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item("K1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ZoteroClient::from_config(&Config::for_testing(&server.uri())).unwrap();
    let fetched = client.get_item("K1").await.unwrap();
    assert_eq!(fetched.key(), "K1");
}

#[tokio::test]
async fn test_local_requests_omit_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/0/items/K1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item("K1")))
        .mount(&server)
        .await;

    let client = ZoteroClient::from_config(&local_config(&server.uri())).unwrap();
    client.get_item("K1").await.unwrap();

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

// =============================================================================
// Paging
// =============================================================================

#[tokio::test]
async fn test_collections_listing_follows_pages() {
    let server = MockServer::start().await;

    let first_page: Vec<_> = (0..100)
        .map(|i| json!({"key": format!("C{i:03}"), "data": {"name": format!("Coll {i}")}}))
        .collect();
    let second_page = json!([{"key": "C100", "data": {"name": "Last"}}]);

    Mock::given(method("GET"))
        .and(path("/users/12345/collections"))
        .and(query_param("start", "0"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first_page))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/12345/collections"))
        .and(query_param("start", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(second_page))
        .expect(1)
        .mount(&server)
        .await;

    let client = ZoteroClient::from_config(&Config::for_testing(&server.uri())).unwrap();
    let collections = client.list_collections(None).await.unwrap();

    assert_eq!(collections.len(), 101);
    assert_eq!(collections[100].name_or_default(), "Last");
}

#[tokio::test]
async fn test_limit_caps_page_size() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/12345/items"))
        .and(query_param("limit", "5"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([item("A"), item("B")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ZoteroClient::from_config(&Config::for_testing(&server.uri())).unwrap();
    let items = client.list_items(&ItemQuery::new().q("rust").limit(Some(5))).await.unwrap();

    assert_eq!(items.len(), 2);
}

// =============================================================================
// Status mapping
// =============================================================================

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let server = MockServer::start().await;

    for (key, status) in [("NF", 404), ("BR", 400), ("FB", 403), ("PF", 412), ("SE", 503), ("TP", 418)] {
        Mock::given(method("GET"))
            .and(path(format!("/users/12345/items/{key}")))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&server)
            .await;
    }

    let client = ZoteroClient::from_config(&Config::for_testing(&server.uri())).unwrap();

    assert!(client.get_item("NF").await.unwrap_err().is_not_found());
    assert!(matches!(client.get_item("BR").await.unwrap_err(), ClientError::BadRequest { .. }));
    assert!(matches!(client.get_item("FB").await.unwrap_err(), ClientError::Forbidden { .. }));
    assert!(matches!(
        client.get_item("PF").await.unwrap_err(),
        ClientError::PreconditionFailed { .. }
    ));
    let server_err = client.get_item("SE").await.unwrap_err();
    assert!(matches!(server_err, ClientError::Server { status: 503, .. }));
    assert!(matches!(
        client.get_item("TP").await.unwrap_err(),
        ClientError::UnexpectedStatus { status: 418, .. }
    ));
}

#[tokio::test]
async fn test_rate_limit_reads_backoff_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/12345/items/RL"))
        .respond_with(ResponseTemplate::new(429).insert_header("Backoff", "7"))
        .mount(&server)
        .await;

    let client = ZoteroClient::from_config(&Config::for_testing(&server.uri())).unwrap();
    let err = client.get_item("RL").await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::RateLimited { retry_after } if retry_after == std::time::Duration::from_secs(7)
    ));
}

#[tokio::test]
async fn test_download_writes_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/12345/items/ATT1/file"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 body".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("paper.pdf");

    let client = ZoteroClient::from_config(&Config::for_testing(&server.uri())).unwrap();
    let written = client.download_attachment("ATT1", &dest).await.unwrap();

    assert_eq!(written, 13);
    assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.7 body");
}

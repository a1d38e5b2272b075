//! Full-text resolution tests against a mocked Zotero API.
//!
//! Covers attachment selection, the index lookup, and the download-and-convert fallback.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zotero_mcp::client::ZoteroClient;
use zotero_mcp::config::Config;
use zotero_mcp::convert::{DocumentConverter, MarkdownConverter};
use zotero_mcp::error::ConversionError;
use zotero_mcp::fulltext::resolve_fulltext;

const LIB: &str = "/users/12345";

fn client(server: &MockServer) -> ZoteroClient {
    ZoteroClient::from_config(&Config::for_testing(&server.uri())).unwrap()
}

fn article_json(key: &str, title: &str) -> serde_json::Value {
    json!({
        "key": key,
        "version": 1,
        "meta": {"numChildren": 2},
        "data": {
            "key": key,
            "itemType": "journalArticle",
            "title": title,
            "creators": [{"creatorType": "author", "firstName": "Grace", "lastName": "Hopper"}],
            "abstractNote": "An abstract."
        }
    })
}

fn attachment_json(key: &str, content_type: &str, filename: &str, md5: &str) -> serde_json::Value {
    json!({
        "key": key,
        "version": 1,
        "data": {
            "key": key,
            "itemType": "attachment",
            "title": format!("{key} attachment"),
            "contentType": content_type,
            "filename": filename,
            "md5": md5,
            "linkMode": "imported_file"
        }
    })
}

fn fulltext_json(content: &str) -> serde_json::Value {
    json!({"content": content, "indexedPages": 1, "totalPages": 1})
}

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("{LIB}{route}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("{LIB}{route}")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Converter that fails with a fixed message.
struct FailingConverter;

impl DocumentConverter for FailingConverter {
    fn convert(&self, _: &Path, _: &str) -> Result<String, ConversionError> {
        Err(ConversionError::Other("corrupt file".to_string()))
    }
}

/// Converter that records the path it was given and returns the file contents.
#[derive(Default)]
struct RecordingConverter {
    seen: Mutex<Vec<PathBuf>>,
}

impl DocumentConverter for RecordingConverter {
    fn convert(&self, path: &Path, _: &str) -> Result<String, ConversionError> {
        self.seen.lock().unwrap().push(path.to_path_buf());
        Ok(std::fs::read_to_string(path)?)
    }
}

// =============================================================================
// Selection
// =============================================================================

#[tokio::test]
async fn test_attachment_item_uses_itself_without_children_fetch() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/ABC123", attachment_json("ABC123", "application/pdf", "a.pdf", "")).await;
    mount_get(&server, "/items/ABC123/fulltext", fulltext_json("Indexed attachment text")).await;
    Mock::given(method("GET"))
        .and(path(format!("{LIB}/items/ABC123/children")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let out = resolve_fulltext(&client(&server), Arc::new(MarkdownConverter), "ABC123").await;

    assert!(out.ends_with("## Full Text\n\nIndexed attachment text"));
}

#[tokio::test]
async fn test_longest_md5_pdf_is_selected() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/XYZ1", article_json("XYZ1", "Parent")).await;
    mount_get(
        &server,
        "/items/XYZ1/children",
        json!([
            attachment_json("SNAP1", "text/html", "snap.html", &"c".repeat(32)),
            attachment_json("PDFA", "application/pdf", "a.pdf", &"a".repeat(32)),
            attachment_json("PDFB", "application/pdf", "b.pdf", &"b".repeat(16)),
        ]),
    )
    .await;
    mount_get(&server, "/items/PDFA/fulltext", fulltext_json("Text of A")).await;
    Mock::given(method("GET"))
        .and(path(format!("{LIB}/items/PDFB/fulltext")))
        .respond_with(ResponseTemplate::new(200).set_body_json(fulltext_json("Text of B")))
        .expect(0)
        .mount(&server)
        .await;

    let out = resolve_fulltext(&client(&server), Arc::new(MarkdownConverter), "XYZ1").await;

    assert!(out.starts_with("# Parent"));
    assert!(out.contains("## Abstract"));
    assert!(out.ends_with("\n\n---\n\n## Full Text\n\nText of A"));
}

#[tokio::test]
async fn test_no_attachment_children() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/NOATT", article_json("NOATT", "Lonely")).await;
    mount_get(
        &server,
        "/items/NOATT/children",
        json!([{"key": "N1", "data": {"itemType": "note", "note": "<p>hi</p>"}}]),
    )
    .await;

    let out = resolve_fulltext(&client(&server), Arc::new(MarkdownConverter), "NOATT").await;

    assert!(out.starts_with("# Lonely"));
    assert!(out.ends_with("\n\n---\n\nNo suitable attachment found for this item."));
}

#[tokio::test]
async fn test_children_fetch_failure_means_no_attachment() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/K1", article_json("K1", "Broken children")).await;
    mount_status(&server, "/items/K1/children", 500).await;

    let out = resolve_fulltext(&client(&server), Arc::new(MarkdownConverter), "K1").await;

    assert!(out.contains("No suitable attachment found for this item."));
}

// =============================================================================
// Item lookup
// =============================================================================

#[tokio::test]
async fn test_missing_item() {
    let server = MockServer::start().await;
    mount_status(&server, "/items/NOPE", 404).await;

    let out = resolve_fulltext(&client(&server), Arc::new(MarkdownConverter), "NOPE").await;
    assert_eq!(out, "No item found with key: NOPE");
}

#[tokio::test]
async fn test_item_fetch_error() {
    let server = MockServer::start().await;
    mount_status(&server, "/items/BAD", 503).await;

    let out = resolve_fulltext(&client(&server), Arc::new(MarkdownConverter), "BAD").await;
    assert!(out.starts_with("Error fetching item full text: "));
    assert!(out.contains("503"));
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/IDEM", article_json("IDEM", "Twice")).await;
    mount_get(
        &server,
        "/items/IDEM/children",
        json!([attachment_json("P1", "application/pdf", "p.pdf", &"a".repeat(32))]),
    )
    .await;
    mount_get(&server, "/items/P1/fulltext", fulltext_json("Same every time")).await;

    let client = client(&server);
    let first = resolve_fulltext(&client, Arc::new(MarkdownConverter), "IDEM").await;
    let second = resolve_fulltext(&client, Arc::new(MarkdownConverter), "IDEM").await;

    assert_eq!(first, second);
}

// =============================================================================
// Download fallback
// =============================================================================

#[tokio::test]
async fn test_empty_index_then_missing_file() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/EMPTY", article_json("EMPTY", "No file")).await;
    mount_get(
        &server,
        "/items/EMPTY/children",
        json!([attachment_json("P2", "application/pdf", "p2.pdf", "")]),
    )
    .await;
    mount_get(&server, "/items/P2/fulltext", fulltext_json("")).await;
    mount_status(&server, "/items/P2/file", 404).await;

    let out = resolve_fulltext(&client(&server), Arc::new(MarkdownConverter), "EMPTY").await;

    assert!(out.starts_with("# No file"));
    assert!(out.ends_with("File download failed."));
}

#[tokio::test]
async fn test_download_error_is_reported() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/DLERR", article_json("DLERR", "Server trouble")).await;
    mount_get(
        &server,
        "/items/DLERR/children",
        json!([attachment_json("P3", "application/pdf", "p3.pdf", "")]),
    )
    .await;
    mount_status(&server, "/items/P3/fulltext", 404).await;
    mount_status(&server, "/items/P3/file", 500).await;

    let out = resolve_fulltext(&client(&server), Arc::new(MarkdownConverter), "DLERR").await;

    assert!(out.contains("\n\n---\n\nError accessing attachment: "));
}

#[tokio::test]
async fn test_conversion_failure_is_inline() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/CORRUPT", article_json("CORRUPT", "Bad PDF")).await;
    mount_get(
        &server,
        "/items/CORRUPT/children",
        json!([attachment_json("P4", "application/pdf", "p4.pdf", "")]),
    )
    .await;
    mount_status(&server, "/items/P4/fulltext", 404).await;
    Mock::given(method("GET"))
        .and(path(format!("{LIB}/items/P4/file")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-garbage".to_vec()))
        .mount(&server)
        .await;

    let out = resolve_fulltext(&client(&server), Arc::new(FailingConverter), "CORRUPT").await;

    let full_text = out.split("## Full Text\n\n").nth(1).unwrap();
    assert!(full_text.starts_with("Error converting file to markdown: "));
    assert!(full_text.contains("corrupt file"));
}

#[tokio::test]
async fn test_download_and_convert_plain_text() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/TXT", article_json("TXT", "Plain")).await;
    mount_get(
        &server,
        "/items/TXT/children",
        json!([attachment_json("T1", "text/plain", "storage/notes.txt", &"0".repeat(32))]),
    )
    .await;
    mount_status(&server, "/items/T1/fulltext", 404).await;
    Mock::given(method("GET"))
        .and(path(format!("{LIB}/items/T1/file")))
        .respond_with(ResponseTemplate::new(200).set_body_string("Downloaded body text\n"))
        .mount(&server)
        .await;

    let converter = Arc::new(RecordingConverter::default());
    let out = resolve_fulltext(&client(&server), converter.clone(), "TXT").await;

    // md5 mismatch is only logged.
    assert!(out.ends_with("## Full Text\n\nDownloaded body text\n"));

    let seen = converter.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].file_name().unwrap(), "notes.txt");
    // Temporary directory is gone once the call returns.
    assert!(!seen[0].exists());
}

#[tokio::test]
async fn test_blank_download_is_conversion_error() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/BLANK", attachment_json("BLANK", "text/plain", "blank.txt", "")).await;
    mount_status(&server, "/items/BLANK/fulltext", 404).await;
    Mock::given(method("GET"))
        .and(path(format!("{LIB}/items/BLANK/file")))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n\n "))
        .mount(&server)
        .await;

    let out = resolve_fulltext(&client(&server), Arc::new(MarkdownConverter), "BLANK").await;

    assert!(out.ends_with("## Full Text\n\nError converting file to markdown: no text could be extracted"));
}

#[tokio::test]
async fn test_default_file_name_uses_key() {
    let server = MockServer::start().await;

    mount_get(&server, "/items/NONAME", attachment_json("NONAME", "application/pdf", "", "")).await;
    mount_get(&server, "/items/NONAME/fulltext", fulltext_json("   ")).await;
    Mock::given(method("GET"))
        .and(path(format!("{LIB}/items/NONAME/file")))
        .respond_with(ResponseTemplate::new(200).set_body_string("bytes"))
        .mount(&server)
        .await;

    let converter = Arc::new(RecordingConverter::default());
    resolve_fulltext(&client(&server), converter.clone(), "NONAME").await;

    let seen = converter.seen.lock().unwrap();
    assert_eq!(seen[0].file_name().unwrap(), "NONAME.pdf");
}

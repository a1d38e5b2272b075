//! Attachment selection.
//!
//! Every item resolves to at most one canonical attachment so that repeated full-text requests
//! for the same item read the same file.

use std::cmp::Reverse;

use crate::client::ZoteroClient;
use crate::models::Item;

/// MIME type ranked first.
const PDF: &str = "application/pdf";

/// MIME prefix ranked second.
const HTML_PREFIX: &str = "text/html";

/// The attachment chosen for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDetails {
    /// Attachment item key.
    pub key: String,
    /// Attachment title.
    pub title: String,
    /// Stored file name; empty when unknown.
    pub filename: String,
    /// MIME type; empty when unknown.
    pub content_type: String,
    /// MD5 of the stored file, when the library reports one.
    pub md5: Option<String>,
}

impl AttachmentDetails {
    /// Details of an attachment item.
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        let data = &item.data;
        Self {
            key: item.key().to_string(),
            title: item.title_or_default().to_string(),
            filename: data.filename.clone().unwrap_or_default(),
            content_type: data.content_type.clone().unwrap_or_default(),
            md5: data.md5.clone().filter(|m| !m.is_empty()),
        }
    }

    /// Check if the attachment is a PDF.
    #[must_use]
    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF
    }
}

/// Selection bucket, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Bucket {
    Pdf,
    Html,
    Other,
}

impl Bucket {
    fn of(content_type: &str) -> Self {
        if content_type == PDF {
            Self::Pdf
        } else if content_type.starts_with(HTML_PREFIX) {
            Self::Html
        } else {
            Self::Other
        }
    }
}

/// Size proxy used for ranking within a bucket.
///
/// The API does not report file sizes, so the length of the `md5` field stands in for it. MD5 hex
/// digests are always 32 characters, so in practice this only separates files that have a stored
/// hash from those that do not.
fn size_proxy(item: &Item) -> usize {
    item.data.md5.as_deref().map_or(0, str::len)
}

/// Pick the best attachment among an item's children.
///
/// Non-attachment children are ignored. PDFs beat HTML snapshots, which beat everything else;
/// within a group the longest `md5` wins and ties keep the order the children were fetched in.
#[must_use]
pub fn pick_attachment(children: &[Item]) -> Option<AttachmentDetails> {
    let mut candidates: Vec<(Bucket, Reverse<usize>, &Item)> = children
        .iter()
        .filter(|child| child.is_attachment())
        .map(|child| {
            let content_type = child.data.content_type.as_deref().unwrap_or_default();
            (Bucket::of(content_type), Reverse(size_proxy(child)), child)
        })
        .collect();

    // Stable: equal keys keep fetch order.
    candidates.sort_by_key(|(bucket, size, _)| (*bucket, *size));

    candidates.first().map(|(_, _, item)| AttachmentDetails::from_item(item))
}

/// Find the attachment to read for an item.
///
/// Attachment items resolve to themselves without a request. For other items the children are
/// fetched; a failed fetch is logged and treated as "no attachment".
pub async fn select_attachment(client: &ZoteroClient, item: &Item) -> Option<AttachmentDetails> {
    if item.is_attachment() {
        return Some(AttachmentDetails::from_item(item));
    }

    match client.get_children(item.key()).await {
        Ok(children) => pick_attachment(&children),
        Err(e) => {
            tracing::warn!(item_key = %item.key(), error = %e, "Failed to fetch children");
            None
        }
    }
}

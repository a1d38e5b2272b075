//! Library-level objects: collections, tags, full-text index entries and write responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A collection (folder) in the library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    /// Collection key.
    #[serde(default)]
    pub key: String,

    /// Object version.
    #[serde(default)]
    pub version: u64,

    /// Editable collection fields.
    #[serde(default)]
    pub data: CollectionData,
}

/// Editable collection fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
    /// Collection name.
    #[serde(default)]
    pub name: Option<String>,

    /// Parent collection key; the API sends `false` for top-level collections.
    #[serde(default, deserialize_with = "key_or_false")]
    pub parent_collection: Option<String>,
}

impl Collection {
    /// Get the collection name, falling back to "Unnamed Collection".
    #[must_use]
    pub fn name_or_default(&self) -> &str {
        self.data.name.as_deref().unwrap_or("Unnamed Collection")
    }

    /// Parent key, if this is a sub-collection.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.data.parent_collection.as_deref().filter(|k| !k.is_empty())
    }
}

fn key_or_false<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// A tag as listed by `/tags`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagEntry {
    /// Tag text.
    pub tag: String,

    /// Tag usage metadata.
    #[serde(default)]
    pub meta: TagMeta,
}

/// Tag usage metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagMeta {
    /// 0 for manual, 1 for automatic.
    #[serde(default, rename = "type")]
    pub tag_type: Option<u8>,

    /// Number of items carrying the tag.
    #[serde(default)]
    pub num_items: Option<u32>,
}

/// Full-text index entry for an attachment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullText {
    /// Indexed text content.
    #[serde(default)]
    pub content: Option<String>,

    /// Pages indexed (PDFs).
    #[serde(default)]
    pub indexed_pages: Option<u32>,

    /// Total pages (PDFs).
    #[serde(default)]
    pub total_pages: Option<u32>,

    /// Characters indexed (text documents).
    #[serde(default)]
    pub indexed_chars: Option<u64>,

    /// Total characters (text documents).
    #[serde(default)]
    pub total_chars: Option<u64>,
}

impl FullText {
    /// Indexed content if present and non-blank.
    #[must_use]
    pub fn non_empty_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Response of multi-object write requests (`POST /items`, `POST /searches`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteResponse {
    /// Request index -> key of created or updated objects.
    #[serde(default)]
    pub success: BTreeMap<String, String>,

    /// Request index -> key of objects that needed no change.
    #[serde(default)]
    pub unchanged: BTreeMap<String, String>,

    /// Request index -> failure.
    #[serde(default)]
    pub failed: BTreeMap<String, WriteFailure>,
}

impl WriteResponse {
    /// Key of the first successfully written object.
    #[must_use]
    pub fn first_key(&self) -> Option<&str> {
        self.success.values().next().map(String::as_str)
    }

    /// Human-readable summary of failures.
    #[must_use]
    pub fn failure_summary(&self) -> String {
        if self.failed.is_empty() {
            return "Unknown error".to_string();
        }
        self.failed
            .values()
            .map(|f| format!("{} ({})", f.message, f.code))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single failed write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteFailure {
    /// HTTP-style status code.
    #[serde(default)]
    pub code: u16,

    /// Error message.
    #[serde(default)]
    pub message: String,
}

/// One condition of a saved search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCondition {
    /// Field (title, creator, date, tag, joinMode, ...).
    pub condition: String,

    /// Operator (is, isNot, contains, doesNotContain, ...).
    pub operator: String,

    /// Comparison value.
    pub value: String,
}

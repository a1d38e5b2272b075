//! Input models for MCP tool parameters.

use serde::{Deserialize, Serialize};

use super::{JoinMode, QueryMode, SortDirection};

/// Input for quick search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItemsInput {
    /// Search query string.
    pub query: String,

    /// Query mode.
    #[serde(default)]
    pub qmode: QueryMode,

    /// Item type filter; `-attachment` excludes attachments.
    #[serde(default = "default_item_type")]
    pub item_type: String,

    /// Maximum results.
    #[serde(default = "default_search_limit")]
    pub limit: Option<u32>,
}

fn default_item_type() -> String {
    "-attachment".to_string()
}

fn default_search_limit() -> Option<u32> {
    Some(10)
}

/// Input for tag search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchByTagInput {
    /// Tag conditions, ANDed. Each supports `a || b` and `-exclude`.
    pub tag: Vec<String>,

    /// Item type filter.
    #[serde(default = "default_item_type")]
    pub item_type: String,

    /// Maximum results.
    #[serde(default = "default_search_limit")]
    pub limit: Option<u32>,
}

/// Input for metadata retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMetadataInput {
    /// Item key.
    pub item_key: String,

    /// Include the abstract.
    #[serde(default = "default_true")]
    pub include_abstract: bool,
}

fn default_true() -> bool {
    true
}

/// Input for tools that only take an item key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemKeyInput {
    /// Item key.
    pub item_key: String,
}

/// Input for tools with an optional result limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitInput {
    /// Maximum results (unbounded when absent).
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Input for collection item listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionItemsInput {
    /// Collection key.
    pub collection_key: String,

    /// Maximum results.
    #[serde(default = "default_collection_limit")]
    pub limit: Option<u32>,
}

fn default_collection_limit() -> Option<u32> {
    Some(50)
}

/// Input for recently added items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentItemsInput {
    /// Number of items; clamped to 1..=100.
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

fn default_recent_limit() -> i64 {
    10
}

impl RecentItemsInput {
    /// Limit clamped the way the tool applies it.
    #[must_use]
    pub const fn effective_limit(&self) -> u32 {
        if self.limit <= 0 {
            10
        } else if self.limit > 100 {
            100
        } else {
            self.limit as u32
        }
    }
}

/// Input for batch tag updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdateTagsInput {
    /// Query selecting the items.
    pub query: String,

    /// Tags to add.
    #[serde(default)]
    pub add_tags: Option<Vec<String>>,

    /// Tags to remove.
    #[serde(default)]
    pub remove_tags: Option<Vec<String>>,

    /// Maximum items to process.
    #[serde(default = "default_batch_limit")]
    pub limit: u32,
}

fn default_batch_limit() -> u32 {
    50
}

/// A user-supplied advanced search condition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionInput {
    /// Field (title, creator/author, date/year, tag, ...).
    #[serde(default)]
    pub field: Option<String>,

    /// Operator (is, isNot, contains, ...).
    #[serde(default)]
    pub operation: Option<String>,

    /// Value; numbers are accepted and stringified.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// Input for advanced search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedSearchInput {
    /// Conditions.
    pub conditions: Vec<ConditionInput>,

    /// How conditions combine.
    #[serde(default)]
    pub join_mode: JoinMode,

    /// Sort field (dateAdded, dateModified, title, creator, ...).
    #[serde(default)]
    pub sort_by: Option<String>,

    /// Sort direction.
    #[serde(default)]
    pub sort_direction: SortDirection,

    /// Maximum results.
    #[serde(default = "default_batch_limit")]
    pub limit: u32,
}

/// Input for note retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesInput {
    /// Restrict to notes of this parent item.
    #[serde(default)]
    pub item_key: Option<String>,

    /// Maximum notes.
    #[serde(default = "default_notes_limit")]
    pub limit: Option<u32>,
}

fn default_notes_limit() -> Option<u32> {
    Some(20)
}

/// Input for annotation retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationsInput {
    /// Restrict to annotations on this item's attachments.
    #[serde(default)]
    pub item_key: Option<String>,

    /// Maximum annotations; 50 library-wide when unset.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Input for note search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchNotesInput {
    /// Text to look for in note bodies.
    pub query: String,

    /// Maximum notes to fetch.
    #[serde(default = "default_notes_limit")]
    pub limit: Option<u32>,
}

/// Input for note creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteInput {
    /// Parent item key.
    pub item_key: String,

    /// Note title.
    pub note_title: String,

    /// Note body; plain text or simple HTML.
    pub note_text: String,

    /// Tags to apply.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

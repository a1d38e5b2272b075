//! Item data model matching the Zotero Web API v3 schema.

use serde::{Deserialize, Serialize};

/// Item type of file and link attachments.
pub const ATTACHMENT: &str = "attachment";

/// Item type of standalone and child notes.
pub const NOTE: &str = "note";

/// Item type of PDF/EPUB/snapshot annotations (children of attachments).
pub const ANNOTATION: &str = "annotation";

/// A Zotero item as returned by `/items` endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    /// Stable item key, unique within a library.
    #[serde(default)]
    pub key: String,

    /// Object version, used for conditional writes.
    #[serde(default)]
    pub version: u64,

    /// Derived metadata (child counts, creator summary).
    #[serde(default)]
    pub meta: ItemMeta,

    /// Editable item fields.
    #[serde(default)]
    pub data: ItemData,
}

/// Derived item metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMeta {
    /// Number of child attachments and notes.
    #[serde(default)]
    pub num_children: Option<u32>,

    /// Creator summary ("Smith et al.").
    #[serde(default)]
    pub creator_summary: Option<String>,

    /// Parsed year of the date field.
    #[serde(default)]
    pub parsed_date: Option<String>,
}

/// Editable item fields.
///
/// Zotero item types share a large field vocabulary; only the fields the tools read are modelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    /// Item key (mirrors [`Item::key`]).
    #[serde(default)]
    pub key: Option<String>,

    /// Item type (journalArticle, book, attachment, note, ...).
    #[serde(default)]
    pub item_type: String,

    /// Title.
    #[serde(default)]
    pub title: Option<String>,

    /// Free-form publication date.
    #[serde(default)]
    pub date: Option<String>,

    /// Ordered creator list.
    #[serde(default)]
    pub creators: Vec<Creator>,

    /// Tags attached to the item.
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Abstract.
    #[serde(default)]
    pub abstract_note: Option<String>,

    /// Journal or proceedings title.
    #[serde(default)]
    pub publication_title: Option<String>,

    /// Journal volume.
    #[serde(default)]
    pub volume: Option<String>,

    /// Journal issue.
    #[serde(default)]
    pub issue: Option<String>,

    /// Page range.
    #[serde(default)]
    pub pages: Option<String>,

    /// Book publisher.
    #[serde(default)]
    pub publisher: Option<String>,

    /// Place of publication.
    #[serde(default)]
    pub place: Option<String>,

    /// Digital Object Identifier.
    #[serde(default, rename = "DOI")]
    pub doi: Option<String>,

    /// Item URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Keys of the collections containing this item.
    #[serde(default)]
    pub collections: Vec<String>,

    /// Parent item key (child attachments and notes only).
    #[serde(default)]
    pub parent_item: Option<String>,

    /// Note HTML (notes only).
    #[serde(default)]
    pub note: Option<String>,

    /// MIME type (attachments only).
    #[serde(default)]
    pub content_type: Option<String>,

    /// Stored file name (attachments only).
    #[serde(default)]
    pub filename: Option<String>,

    /// MD5 of the stored file (attachments only).
    #[serde(default)]
    pub md5: Option<String>,

    /// Attachment link mode (imported_file, linked_url, ...).
    #[serde(default)]
    pub link_mode: Option<String>,

    /// Timestamp the item was added.
    #[serde(default)]
    pub date_added: Option<String>,

    /// Annotation kind (highlight, underline, note, image, ink).
    #[serde(default)]
    pub annotation_type: Option<String>,

    /// Highlighted text.
    #[serde(default)]
    pub annotation_text: Option<String>,

    /// Reader comment.
    #[serde(default)]
    pub annotation_comment: Option<String>,

    /// Hex colour, e.g. `#ffd400`.
    #[serde(default)]
    pub annotation_color: Option<String>,

    /// Page label as shown in the reader.
    #[serde(default)]
    pub annotation_page_label: Option<String>,
}

impl Item {
    /// Item type string.
    #[must_use]
    pub fn item_type(&self) -> &str {
        &self.data.item_type
    }

    /// Check if this item is an attachment.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.data.item_type == ATTACHMENT
    }

    /// Check if this item is a note.
    #[must_use]
    pub fn is_note(&self) -> bool {
        self.data.item_type == NOTE
    }

    /// Check if this item is an annotation.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.data.item_type == ANNOTATION
    }

    /// Get the item title, falling back to "Untitled" if not available.
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.data.title.as_deref().unwrap_or("Untitled")
    }

    /// Item key, preferring the top-level key over the data copy.
    #[must_use]
    pub fn key(&self) -> &str {
        if self.key.is_empty() {
            self.data.key.as_deref().unwrap_or_default()
        } else {
            &self.key
        }
    }

    /// Tag names in item order.
    #[must_use]
    pub fn tag_names(&self) -> Vec<&str> {
        self.data.tags.iter().map(|t| t.tag.as_str()).collect()
    }

    /// Child count hint from item metadata.
    #[must_use]
    pub fn num_children(&self) -> u32 {
        self.meta.num_children.unwrap_or(0)
    }
}

/// An item creator: either a two-field person name or a single-field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    /// Role (author, editor, ...).
    #[serde(default)]
    pub creator_type: Option<String>,

    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Single-field name (institutions, mononyms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Creator {
    /// Two-field person creator.
    #[must_use]
    pub fn person(first: &str, last: &str) -> Self {
        Self {
            creator_type: Some("author".to_string()),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            name: None,
        }
    }

    /// Single-field creator.
    #[must_use]
    pub fn single(name: &str) -> Self {
        Self { creator_type: Some("author".to_string()), name: Some(name.to_string()), ..Default::default() }
    }

    /// Display name: "Last, First", or the single-field name.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name, &self.name) {
            (Some(first), Some(last), _) => Some(format!("{last}, {first}")),
            (_, _, Some(name)) => Some(name.clone()),
            _ => None,
        }
    }
}

/// A tag on an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag text.
    pub tag: String,

    /// 0 for manual tags, 1 for automatic tags.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub tag_type: Option<u8>,
}

impl Tag {
    /// Manual tag with the given text.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), tag_type: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_deserialize_api_shape() {
        let item: Item = serde_json::from_value(json!({
            "key": "ABCD2345",
            "version": 42,
            "meta": {"numChildren": 2, "creatorSummary": "Doe"},
            "data": {
                "key": "ABCD2345",
                "itemType": "journalArticle",
                "title": "A Study",
                "creators": [{"creatorType": "author", "firstName": "Jane", "lastName": "Doe"}],
                "tags": [{"tag": "ml"}, {"tag": "auto", "type": 1}],
                "DOI": "10.1/xyz",
                "relations": {}
            }
        }))
        .unwrap();

        assert_eq!(item.key(), "ABCD2345");
        assert_eq!(item.version, 42);
        assert_eq!(item.num_children(), 2);
        assert_eq!(item.data.doi.as_deref(), Some("10.1/xyz"));
        assert_eq!(item.tag_names(), vec!["ml", "auto"]);
        assert!(!item.is_attachment());
    }

    #[test]
    fn test_item_key_falls_back_to_data_key() {
        let item: Item =
            serde_json::from_value(json!({"data": {"key": "K1", "itemType": "note"}})).unwrap();
        assert_eq!(item.key(), "K1");
        assert!(item.is_note());
        assert_eq!(item.title_or_default(), "Untitled");
    }

    #[test]
    fn test_creator_display_name() {
        assert_eq!(Creator::person("Ada", "Lovelace").display_name().as_deref(), Some("Lovelace, Ada"));
        assert_eq!(Creator::single("WHO").display_name().as_deref(), Some("WHO"));
        assert_eq!(Creator::default().display_name(), None);
    }

    #[test]
    fn test_tag_serializes_without_type() {
        let value = serde_json::to_value(Tag::new("reviewed")).unwrap();
        assert_eq!(value, json!({"tag": "reviewed"}));
    }

    #[test]
    fn test_annotation_fields() {
        let item: Item = serde_json::from_value(json!({
            "key": "ANN1",
            "data": {
                "itemType": "annotation",
                "parentItem": "PDF1",
                "annotationType": "highlight",
                "annotationText": "important",
                "annotationComment": "check this",
                "annotationColor": "#ffd400",
                "annotationPageLabel": "12"
            }
        }))
        .unwrap();

        assert!(item.is_annotation());
        assert!(!item.is_attachment());
        assert_eq!(item.data.annotation_text.as_deref(), Some("important"));
        assert_eq!(item.data.annotation_page_label.as_deref(), Some("12"));
    }
}

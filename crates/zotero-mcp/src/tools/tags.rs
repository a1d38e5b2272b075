//! Tag tools: zotero_get_tags, zotero_batch_update_tags.

use std::collections::HashSet;

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::client::ItemQuery;
use crate::error::{ToolError, ToolResult};
use crate::formatters::format_tags;
use crate::models::{BatchUpdateTagsInput, Item, LimitInput, Tag};

/// Tag listing tool.
pub struct TagsTool;

#[async_trait::async_trait]
impl McpTool for TagsTool {
    fn name(&self) -> &'static str {
        "zotero_get_tags"
    }

    fn description(&self) -> &'static str {
        "Get all tags used in your Zotero library, grouped alphabetically."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "description": "Maximum tags to return (all when omitted)"
                }
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: LimitInput = serde_json::from_value(input)?;

        tracing::info!("Fetching tags");

        let client = ctx.client()?;
        let tags = client.list_tags(params.limit).await?;

        if tags.is_empty() {
            return Ok("No tags found in your Zotero library.".to_string());
        }

        Ok(format_tags(&tags))
    }
}

/// Batch tag update tool.
pub struct BatchUpdateTagsTool;

/// Outcome of applying a tag edit to one item.
#[derive(Debug, PartialEq, Eq)]
struct TagEdit {
    tags: Vec<Tag>,
    added: Vec<usize>,
    removed: Vec<usize>,
}

impl TagEdit {
    fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Remove then add tags. Indices refer to positions in `add` / `remove`.
fn edit_tags(item: &Item, add: &[String], remove: &[String]) -> TagEdit {
    let existing: HashSet<&str> = item.data.tags.iter().map(|t| t.tag.as_str()).collect();

    let mut removed = Vec::new();
    let mut tags: Vec<Tag> = Vec::with_capacity(item.data.tags.len() + add.len());
    for tag in &item.data.tags {
        match remove.iter().position(|r| *r == tag.tag) {
            Some(index) => removed.push(index),
            None => tags.push(tag.clone()),
        }
    }

    let mut added = Vec::new();
    for (index, tag) in add.iter().enumerate() {
        if !tag.is_empty() && !existing.contains(tag.as_str()) {
            tags.push(Tag::new(tag.clone()));
            added.push(index);
        }
    }

    TagEdit { tags, added, removed }
}

#[async_trait::async_trait]
impl McpTool for BatchUpdateTagsTool {
    fn name(&self) -> &'static str {
        "zotero_batch_update_tags"
    }

    fn description(&self) -> &'static str {
        "Batch update tags across multiple items matching a search query."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query selecting the items to update"
                },
                "add_tags": {
                    "type": "array",
                    "items": {"type": "string"}
                },
                "remove_tags": {
                    "type": "array",
                    "items": {"type": "string"}
                },
                "limit": {
                    "type": "integer",
                    "default": 50
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: BatchUpdateTagsInput = serde_json::from_value(input)?;

        if params.query.trim().is_empty() {
            return Err(ToolError::validation("query", "Search query cannot be empty"));
        }

        let add = params.add_tags.unwrap_or_default();
        let remove = params.remove_tags.unwrap_or_default();
        if add.is_empty() && remove.is_empty() {
            return Err(ToolError::validation(
                "add_tags",
                "You must specify either tags to add or tags to remove",
            ));
        }

        tracing::info!(query = %params.query, "Batch updating tags");

        let client = ctx.client()?;
        let query = ItemQuery::new().q(&params.query).limit(Some(params.limit));
        let items = client.list_items(&query).await?;

        if items.is_empty() {
            return Ok(format!("No items found matching query: '{}'", params.query));
        }

        let mut added_counts = vec![0usize; add.len()];
        let mut removed_counts = vec![0usize; remove.len()];
        let mut updated = 0usize;
        let mut skipped = 0usize;

        for item in &items {
            if item.is_attachment() {
                skipped += 1;
                continue;
            }

            let edit = edit_tags(item, &add, &remove);
            if !edit.changed() {
                skipped += 1;
                continue;
            }

            client.update_item_tags(item, &edit.tags).await?;
            for index in &edit.added {
                added_counts[*index] += 1;
            }
            for index in &edit.removed {
                removed_counts[*index] += 1;
            }
            updated += 1;
        }

        let mut output = vec![
            "# Batch Tag Update Results".to_string(),
            String::new(),
            format!("Query: '{}'", params.query),
            format!("Items processed: {}", items.len()),
            format!("Items updated: {updated}"),
            format!("Items skipped: {skipped}"),
        ];

        if !add.is_empty() {
            output.push("\n## Tags Added".to_string());
            for (tag, count) in add.iter().zip(&added_counts) {
                output.push(format!("- `{tag}`: {count} items"));
            }
        }

        if !remove.is_empty() {
            output.push("\n## Tags Removed".to_string());
            for (tag, count) in remove.iter().zip(&removed_counts) {
                output.push(format!("- `{tag}`: {count} items"));
            }
        }

        Ok(output.join("\n"))
    }
}

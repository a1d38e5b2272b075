//! Item tools: zotero_get_item_metadata, zotero_get_item_fulltext, zotero_get_item_children.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::error::ToolResult;
use crate::formatters::{format_children, format_item_metadata};
use crate::fulltext::resolve_fulltext;
use crate::models::{ItemKeyInput, ItemMetadataInput};

/// Item metadata tool.
pub struct ItemMetadataTool;

#[async_trait::async_trait]
impl McpTool for ItemMetadataTool {
    fn name(&self) -> &'static str {
        "zotero_get_item_metadata"
    }

    fn description(&self) -> &'static str {
        "Get detailed metadata for a specific Zotero item by its key."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "item_key": {
                    "type": "string",
                    "description": "Zotero item key"
                },
                "include_abstract": {
                    "type": "boolean",
                    "default": true
                }
            },
            "required": ["item_key"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ItemMetadataInput = serde_json::from_value(input)?;

        tracing::info!(item_key = %params.item_key, "Fetching item metadata");

        let client = ctx.client()?;
        match client.get_item(&params.item_key).await {
            Ok(item) => Ok(format_item_metadata(&item, params.include_abstract)),
            Err(e) if e.is_not_found() => Ok(format!("No item found with key: {}", params.item_key)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Full text tool.
pub struct ItemFulltextTool;

#[async_trait::async_trait]
impl McpTool for ItemFulltextTool {
    fn name(&self) -> &'static str {
        "zotero_get_item_fulltext"
    }

    fn description(&self) -> &'static str {
        "Get the full text content of a Zotero item. Uses the library's full-text index when \
         available, otherwise downloads and converts the best attachment (PDF first)."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "item_key": {
                    "type": "string",
                    "description": "Zotero item key (a regular item or an attachment)"
                }
            },
            "required": ["item_key"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ItemKeyInput = serde_json::from_value(input)?;

        tracing::info!(item_key = %params.item_key, "Fetching item full text");

        let client = ctx.client()?;
        Ok(resolve_fulltext(&client, ctx.converter.clone(), &params.item_key).await)
    }
}

/// Child items tool.
pub struct ItemChildrenTool;

#[async_trait::async_trait]
impl McpTool for ItemChildrenTool {
    fn name(&self) -> &'static str {
        "zotero_get_item_children"
    }

    fn description(&self) -> &'static str {
        "Get all child items (attachments, notes) for a specific Zotero item."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "item_key": {
                    "type": "string",
                    "description": "Zotero item key"
                }
            },
            "required": ["item_key"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ItemKeyInput = serde_json::from_value(input)?;
        let key = &params.item_key;

        tracing::info!(item_key = %key, "Fetching item children");

        let client = ctx.client()?;

        let parent_title = match client.get_item(key).await {
            Ok(parent) => parent.data.title.unwrap_or_else(|| "Untitled Item".to_string()),
            Err(e) => {
                tracing::debug!(item_key = %key, error = %e, "Parent lookup failed");
                format!("Item {key}")
            }
        };

        let children = client.get_children(key).await?;
        if children.is_empty() {
            return Ok(format!("No child items found for: {parent_title} (Key: {key})"));
        }

        Ok(format_children(&parent_title, &children))
    }
}

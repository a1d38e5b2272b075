//! Collection tools: zotero_get_collections, zotero_get_collection_items.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::error::ToolResult;
use crate::formatters::{ListStyle, format_collections, format_item_list};
use crate::models::{CollectionItemsInput, LimitInput};

/// Collection tree tool.
pub struct CollectionsTool;

#[async_trait::async_trait]
impl McpTool for CollectionsTool {
    fn name(&self) -> &'static str {
        "zotero_get_collections"
    }

    fn description(&self) -> &'static str {
        "List all collections in your Zotero library as a hierarchy."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "description": "Maximum collections to return (all when omitted)"
                }
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: LimitInput = serde_json::from_value(input)?;

        tracing::info!("Fetching collections");

        let client = ctx.client()?;
        let collections = client.list_collections(params.limit).await?;

        if collections.is_empty() {
            return Ok("# Zotero Collections\n\nNo collections found in your Zotero library.".to_string());
        }

        Ok(format_collections(&collections))
    }
}

/// Collection contents tool.
pub struct CollectionItemsTool;

#[async_trait::async_trait]
impl McpTool for CollectionItemsTool {
    fn name(&self) -> &'static str {
        "zotero_get_collection_items"
    }

    fn description(&self) -> &'static str {
        "Get all items in a specific Zotero collection."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "collection_key": {
                    "type": "string",
                    "description": "Collection key"
                },
                "limit": {
                    "type": "integer",
                    "default": 50
                }
            },
            "required": ["collection_key"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: CollectionItemsInput = serde_json::from_value(input)?;
        let key = &params.collection_key;

        tracing::info!(collection_key = %key, "Fetching collection items");

        let client = ctx.client()?;

        let name = match client.get_collection(key).await {
            Ok(collection) => collection.name_or_default().to_string(),
            Err(e) => {
                tracing::debug!(collection_key = %key, error = %e, "Collection lookup failed");
                format!("Collection {key}")
            }
        };

        let items = client.collection_items(key, params.limit).await?;
        if items.is_empty() {
            return Ok(format!("No items found in collection: {name} (Key: {key})"));
        }

        let mut output = vec![format!("# Items in Collection: {name}"), String::new()];
        output.extend(format_item_list(&items, ListStyle::BRIEF));
        Ok(output.join("\n"))
    }
}

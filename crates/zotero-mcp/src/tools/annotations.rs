//! Annotation tool: zotero_get_annotations.

use std::collections::BTreeMap;

use serde_json::json;

use super::{McpTool, ToolContext, parent_titles};
use crate::client::{ItemQuery, ZoteroClient};
use crate::error::ToolResult;
use crate::formatters::{format_annotations, parent_context};
use crate::models::{ANNOTATION, AnnotationsInput, Item};

const DEFAULT_LIBRARY_LIMIT: u32 = 50;

/// Annotation tool.
pub struct AnnotationsTool;

#[async_trait::async_trait]
impl McpTool for AnnotationsTool {
    fn name(&self) -> &'static str {
        "zotero_get_annotations"
    }

    fn description(&self) -> &'static str {
        "Get PDF and EPUB annotations (highlights, comments, notes) for an item's attachments, or the \
         most recent annotations across the library."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "item_key": {
                    "type": "string",
                    "description": "Parent item or attachment key (omit for library-wide annotations)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of annotations to return"
                }
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: AnnotationsInput = serde_json::from_value(input)?;
        let client = ctx.client()?;

        match params.item_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => item_annotations(&client, key, params.limit).await,
            None => library_annotations(&client, params.limit).await,
        }
    }
}

/// Annotations under one item: its own annotation children plus those of each attachment.
async fn item_annotations(client: &ZoteroClient, key: &str, limit: Option<u32>) -> ToolResult<String> {
    tracing::info!(item_key = %key, "Fetching annotations");

    let parent = match client.get_item(key).await {
        Ok(item) => item,
        Err(e) if e.is_not_found() => return Ok(format!("No item found with key: {key}")),
        Err(e) => return Err(e.into()),
    };
    let title = parent.data.title.as_deref().unwrap_or("Untitled Item");

    let mut annotations = Vec::new();
    let mut context = BTreeMap::new();

    let children = client.get_children(key).await?;
    for child in children {
        if child.is_annotation() {
            annotations.push(child);
        } else if child.is_attachment() && !parent.is_attachment() {
            let attachment_title = child.title_or_default().to_string();
            match client.get_children(child.key()).await {
                Ok(grandchildren) => {
                    for annotation in grandchildren.into_iter().filter(Item::is_annotation) {
                        context.insert(annotation.key().to_string(), format!(" in {attachment_title}"));
                        annotations.push(annotation);
                    }
                }
                Err(e) => {
                    tracing::warn!(attachment_key = %child.key(), error = %e, "Attachment children lookup failed");
                }
            }
        }
    }

    if let Some(limit) = limit {
        annotations.truncate(limit as usize);
    }

    if annotations.is_empty() {
        return Ok(format!("No annotations found for item: {title}."));
    }

    Ok(format_annotations(&format!("# Annotations for: {title}"), &annotations, &context))
}

/// Most recent annotations across the library, labelled with their attachment.
async fn library_annotations(client: &ZoteroClient, limit: Option<u32>) -> ToolResult<String> {
    tracing::info!("Fetching library annotations");

    let query = ItemQuery::new().item_type(ANNOTATION).limit(Some(limit.unwrap_or(DEFAULT_LIBRARY_LIMIT)));
    let annotations = client.list_items(&query).await?;

    if annotations.is_empty() {
        return Ok("No annotations found.".to_string());
    }

    let titles = parent_titles(client, &annotations).await;
    let context = annotations
        .iter()
        .map(|a| (a.key().to_string(), parent_context(a, &titles)))
        .collect();

    Ok(format_annotations("# Annotations", &annotations, &context))
}

//! Note tools: zotero_get_notes, zotero_search_notes, zotero_create_note.

use serde_json::json;

use super::{McpTool, ToolContext, parent_titles};
use crate::client::ItemQuery;
use crate::error::{ToolError, ToolResult};
use crate::formatters::{clean_note_html, format_note_matches, format_notes};
use crate::models::{CreateNoteInput, NOTE, NotesInput, QueryMode, SearchNotesInput, Tag};

/// Note listing tool.
pub struct NotesTool;

#[async_trait::async_trait]
impl McpTool for NotesTool {
    fn name(&self) -> &'static str {
        "zotero_get_notes"
    }

    fn description(&self) -> &'static str {
        "Retrieve notes from your Zotero library, optionally only those of one item."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "item_key": {
                    "type": "string",
                    "description": "Only notes attached to this item"
                },
                "limit": {
                    "type": "integer",
                    "default": 20
                }
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: NotesInput = serde_json::from_value(input)?;
        let item_key = params.item_key.as_deref().filter(|k| !k.trim().is_empty());

        tracing::info!(item_key = ?item_key, "Fetching notes");

        let client = ctx.client()?;
        let notes = match item_key {
            Some(key) => client.list_item_notes(key, params.limit).await?,
            None => {
                let query = ItemQuery::new().item_type(NOTE).limit(params.limit);
                client.list_items(&query).await?
            }
        };

        if notes.is_empty() {
            return Ok(match item_key {
                Some(key) => format!("No notes found for item {key}."),
                None => "No notes found.".to_string(),
            });
        }

        let titles = parent_titles(&client, &notes).await;

        let heading = match item_key {
            Some(key) => format!("# Notes for Item: {key}"),
            None => "# Notes".to_string(),
        };

        Ok(format_notes(&heading, &notes, &titles))
    }
}

/// Note search tool.
pub struct SearchNotesTool;

#[async_trait::async_trait]
impl McpTool for SearchNotesTool {
    fn name(&self) -> &'static str {
        "zotero_search_notes"
    }

    fn description(&self) -> &'static str {
        "Search the text of notes across your Zotero library and show an excerpt around each match."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Text to find in note bodies (case-insensitive)"
                },
                "limit": {
                    "type": "integer",
                    "default": 20
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchNotesInput = serde_json::from_value(input)?;
        let query = params.query.trim();

        if query.is_empty() {
            return Err(ToolError::validation("query", "Search query cannot be empty"));
        }

        tracing::info!(query = %query, "Searching notes");

        let client = ctx.client()?;
        let search = ItemQuery::new()
            .q(query)
            .qmode(QueryMode::Everything)
            .item_type(NOTE)
            .limit(params.limit);
        let notes = client.list_items(&search).await?;

        // The quick search also matches tags and markup; keep notes whose visible text has the query.
        let needle = query.to_lowercase();
        let matches: Vec<_> = notes
            .into_iter()
            .filter(|n| {
                clean_note_html(n.data.note.as_deref().unwrap_or_default()).to_lowercase().contains(&needle)
            })
            .collect();

        if matches.is_empty() {
            return Ok(format!("No notes found matching query: '{query}'"));
        }

        let titles = parent_titles(&client, &matches).await;
        Ok(format_note_matches(query, &matches, &titles))
    }
}

/// Note creation tool.
pub struct CreateNoteTool;

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Note HTML: a title heading followed by the body.
///
/// Bodies that already contain `<p>` or `<div>` are kept as HTML; plain text becomes one
/// paragraph per blank-line-separated block with `<br/>` for single newlines.
fn note_html(title: &str, text: &str) -> String {
    let body = if text.contains("<p>") || text.contains("<div>") {
        text.to_string()
    } else {
        text.split("\n\n")
            .map(|paragraph| format!("<p>{}</p>", escape_html(paragraph).replace('\n', "<br/>")))
            .collect()
    };

    let title = title.trim();
    if title.is_empty() { body } else { format!("<h1>{}</h1>{body}", escape_html(title)) }
}

#[async_trait::async_trait]
impl McpTool for CreateNoteTool {
    fn name(&self) -> &'static str {
        "zotero_create_note"
    }

    fn description(&self) -> &'static str {
        "Create a new note attached to a Zotero item."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "item_key": {
                    "type": "string",
                    "description": "Parent item key"
                },
                "note_title": {
                    "type": "string"
                },
                "note_text": {
                    "type": "string",
                    "description": "Note body; plain text or simple HTML"
                },
                "tags": {
                    "type": "array",
                    "items": {"type": "string"}
                }
            },
            "required": ["item_key", "note_title", "note_text"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: CreateNoteInput = serde_json::from_value(input)?;
        let key = &params.item_key;

        tracing::info!(item_key = %key, "Creating note");

        let client = ctx.client()?;
        let parent = match client.get_item(key).await {
            Ok(parent) => parent,
            Err(e) if e.is_not_found() => return Ok(format!("No item found with key: {key}")),
            Err(e) => return Err(e.into()),
        };
        let parent_title = parent.data.title.as_deref().unwrap_or("Untitled Item");

        let tags: Vec<Tag> = params.tags.unwrap_or_default().into_iter().map(Tag::new).collect();
        let note = json!({
            "itemType": NOTE,
            "parentItem": key,
            "note": note_html(&params.note_title, &params.note_text),
            "tags": tags,
        });

        let response = client.create_items(&[note]).await?;
        match response.first_key() {
            Some(note_key) => {
                Ok(format!("Successfully created note for \"{parent_title}\"\n\nNote key: {note_key}"))
            }
            None => Err(ToolError::internal(format!(
                "Failed to create note: {}",
                response.failure_summary()
            ))),
        }
    }
}

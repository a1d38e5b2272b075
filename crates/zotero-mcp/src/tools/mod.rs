//! MCP tool implementations.
//!
//! Each tool module provides structs that:
//! 1. Parse and validate input parameters
//! 2. Call the Zotero API client
//! 3. Format results as Markdown

mod annotations;
mod collections;
mod items;
mod notes;
mod search;
mod tags;

pub use annotations::*;
pub use collections::*;
pub use items::*;
pub use notes::*;
pub use search::*;
pub use tags::*;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::client::ZoteroClient;
use crate::config::Config;
use crate::convert::{DocumentConverter, MarkdownConverter};
use crate::error::ToolResult;
use crate::models::Item;

/// Tool execution context.
///
/// Holds the immutable configuration; every tool call builds its own client from it.
#[derive(Clone)]
pub struct ToolContext {
    /// Server configuration.
    pub config: Arc<Config>,

    /// Converter for downloaded attachments.
    pub converter: Arc<dyn DocumentConverter>,
}

impl ToolContext {
    /// Create a tool context with the default converter.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_converter(config, Arc::new(MarkdownConverter))
    }

    /// Create a tool context with a custom converter.
    #[must_use]
    pub fn with_converter(config: Config, converter: Arc<dyn DocumentConverter>) -> Self {
        Self { config: Arc::new(config), converter }
    }

    /// Build a client for one tool call.
    pub fn client(&self) -> ToolResult<ZoteroClient> {
        Ok(ZoteroClient::from_config(&self.config)?)
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext").field("config", &self.config).finish()
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "zotero_search_items").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Titles of the parents of `items`, keyed by parent key.
///
/// Each distinct parent is fetched once; failed lookups are left out so callers fall back to the
/// key.
pub(crate) async fn parent_titles(client: &ZoteroClient, items: &[Item]) -> BTreeMap<String, String> {
    let mut titles = BTreeMap::new();
    let mut failed = Vec::new();
    for parent in items.iter().filter_map(|i| i.data.parent_item.as_deref()) {
        if titles.contains_key(parent) || failed.contains(&parent) {
            continue;
        }
        match client.get_item(parent).await {
            Ok(item) => {
                titles.insert(parent.to_string(), item.title_or_default().to_string());
            }
            Err(e) => {
                tracing::debug!(parent_key = %parent, error = %e, "Parent lookup failed");
                failed.push(parent);
            }
        }
    }
    titles
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Search tools (4)
        Box::new(search::SearchItemsTool),
        Box::new(search::SearchByTagTool),
        Box::new(search::AdvancedSearchTool),
        Box::new(search::RecentItemsTool),

        // Item tools (3)
        Box::new(items::ItemMetadataTool),
        Box::new(items::ItemFulltextTool),
        Box::new(items::ItemChildrenTool),

        // Collection tools (2)
        Box::new(collections::CollectionsTool),
        Box::new(collections::CollectionItemsTool),

        // Tag tools (2)
        Box::new(tags::TagsTool),
        Box::new(tags::BatchUpdateTagsTool),

        // Note tools (3)
        Box::new(notes::NotesTool),
        Box::new(notes::SearchNotesTool),
        Box::new(notes::CreateNoteTool),

        // Annotation tools (1)
        Box::new(annotations::AnnotationsTool),
    ]
}

//! Search tools: zotero_search_items, zotero_search_by_tag, zotero_advanced_search,
//! zotero_get_recent.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::client::ItemQuery;
use crate::error::{ToolError, ToolResult};
use crate::formatters::{ListStyle, format_item_list};
use crate::models::{
    AdvancedSearchInput, ConditionInput, RecentItemsInput, SearchByTagInput, SearchCondition,
    SearchItemsInput, SortDirection,
};

/// Quick search tool.
pub struct SearchItemsTool;

#[async_trait::async_trait]
impl McpTool for SearchItemsTool {
    fn name(&self) -> &'static str {
        "zotero_search_items"
    }

    fn description(&self) -> &'static str {
        "Search for items in your Zotero library, given a query string, query mode \
         (titleCreatorYear or everything), and optional item type filter."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query string"
                },
                "qmode": {
                    "type": "string",
                    "enum": ["titleCreatorYear", "everything"],
                    "default": "titleCreatorYear"
                },
                "item_type": {
                    "type": "string",
                    "default": "-attachment",
                    "description": "Item type filter; '-attachment' excludes attachments"
                },
                "limit": {
                    "type": "integer",
                    "default": 10
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchItemsInput = serde_json::from_value(input)?;

        if params.query.trim().is_empty() {
            return Err(ToolError::validation("query", "Search query cannot be empty"));
        }

        tracing::info!(query = %params.query, "Searching items");

        let client = ctx.client()?;
        let query = ItemQuery::new()
            .q(&params.query)
            .qmode(params.qmode)
            .item_type(&params.item_type)
            .limit(params.limit);
        let items = client.list_items(&query).await?;

        if items.is_empty() {
            return Ok(format!("No items found matching query: '{}'", params.query));
        }

        let mut output = vec![format!("# Search Results for '{}'", params.query), String::new()];
        output.extend(format_item_list(&items, ListStyle::SEARCH));
        Ok(output.join("\n"))
    }
}

/// Tag search tool.
pub struct SearchByTagTool;

#[async_trait::async_trait]
impl McpTool for SearchByTagTool {
    fn name(&self) -> &'static str {
        "zotero_search_by_tag"
    }

    fn description(&self) -> &'static str {
        "Search for items in your Zotero library by tag. \
         Conditions are ANDed, each term supports disjunction `||` and exclusion `-`."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "tag": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Tag conditions, e.g. [\"ml || ai\", \"-draft\"]"
                },
                "item_type": {
                    "type": "string",
                    "default": "-attachment"
                },
                "limit": {
                    "type": "integer",
                    "default": 10
                }
            },
            "required": ["tag"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchByTagInput = serde_json::from_value(input)?;

        let conditions: Vec<&str> =
            params.tag.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
        if conditions.is_empty() {
            return Err(ToolError::validation("tag", "Tag cannot be empty"));
        }
        let label = conditions.join(", ");

        tracing::info!(tags = %label, "Searching items by tag");

        let client = ctx.client()?;
        let query = conditions
            .iter()
            .fold(ItemQuery::new(), |query, tag| query.tag(*tag))
            .item_type(&params.item_type)
            .limit(params.limit);
        let items = client.list_items(&query).await?;

        if items.is_empty() {
            return Ok(format!("No items found with tag: '{label}'"));
        }

        let mut output = vec![format!("# Search Results for Tag: '{label}'"), String::new()];
        output.extend(format_item_list(&items, ListStyle::SEARCH));
        Ok(output.join("\n"))
    }
}

/// Recently added items tool.
pub struct RecentItemsTool;

#[async_trait::async_trait]
impl McpTool for RecentItemsTool {
    fn name(&self) -> &'static str {
        "zotero_get_recent"
    }

    fn description(&self) -> &'static str {
        "Get recently added items to your Zotero library."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "default": 10,
                    "maximum": 100
                }
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: RecentItemsInput = serde_json::from_value(input)?;
        let limit = params.effective_limit();

        tracing::info!(limit, "Fetching recent items");

        let client = ctx.client()?;
        let query = ItemQuery::new().limit(Some(limit)).sort("dateAdded", SortDirection::Desc);
        let items = client.list_items(&query).await?;

        if items.is_empty() {
            return Ok("No items found in your Zotero library.".to_string());
        }

        let style = ListStyle { date_added: true, ..ListStyle::BRIEF };
        let mut output = vec![format!("# {limit} Most Recently Added Items"), String::new()];
        output.extend(format_item_list(&items, style));
        Ok(output.join("\n"))
    }
}

/// Advanced multi-condition search tool.
///
/// Runs through a temporary saved search that is deleted afterwards.
pub struct AdvancedSearchTool;

impl AdvancedSearchTool {
    /// Map user conditions to saved-search conditions, appending the join mode.
    fn build_conditions(params: &AdvancedSearchInput) -> ToolResult<Vec<SearchCondition>> {
        if params.conditions.is_empty() {
            return Err(ToolError::validation("conditions", "No search conditions provided"));
        }

        let mut conditions = Vec::with_capacity(params.conditions.len() + 1);
        for (i, condition) in params.conditions.iter().enumerate() {
            let (Some(field), Some(operation), Some(value)) =
                (&condition.field, &condition.operation, &condition.value)
            else {
                return Err(ToolError::validation(
                    "conditions",
                    format!("Condition {} is missing required fields (field, operation, value)", i + 1),
                ));
            };

            let field = match field.as_str() {
                "author" | "creator" => "creator",
                "year" => "date",
                other => other,
            };

            conditions.push(SearchCondition {
                condition: field.to_string(),
                operator: operation.clone(),
                value: value_string(value),
            });
        }

        conditions.push(SearchCondition {
            condition: "joinMode".to_string(),
            operator: params.join_mode.as_str().to_string(),
            value: String::new(),
        });

        Ok(conditions)
    }

    fn criteria_line(index: usize, condition: &ConditionInput) -> String {
        format!(
            "{index}. {} {} \"{}\"",
            condition.field.as_deref().unwrap_or_default(),
            condition.operation.as_deref().unwrap_or_default(),
            condition.value.as_ref().map(value_string).unwrap_or_default()
        )
    }
}

fn value_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait::async_trait]
impl McpTool for AdvancedSearchTool {
    fn name(&self) -> &'static str {
        "zotero_advanced_search"
    }

    fn description(&self) -> &'static str {
        "Perform an advanced search with multiple criteria \
         (field, operation, value), combined with 'all' or 'any'."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "conditions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "field": {"type": "string", "description": "title, creator, date, tag, ..."},
                            "operation": {"type": "string", "description": "is, isNot, contains, ..."},
                            "value": {"type": ["string", "number"]}
                        },
                        "required": ["field", "operation", "value"]
                    }
                },
                "join_mode": {
                    "type": "string",
                    "enum": ["all", "any"],
                    "default": "all"
                },
                "sort_by": {
                    "type": "string",
                    "description": "dateAdded, dateModified, title, creator, ..."
                },
                "sort_direction": {
                    "type": "string",
                    "enum": ["asc", "desc"],
                    "default": "asc"
                },
                "limit": {
                    "type": "integer",
                    "default": 50
                }
            },
            "required": ["conditions"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: AdvancedSearchInput = serde_json::from_value(input)?;
        let conditions = Self::build_conditions(&params)?;

        tracing::info!(conditions = params.conditions.len(), "Running advanced search");

        let client = ctx.client()?;

        let simple = uuid::Uuid::new_v4().simple().to_string();
        let search_name = format!("temp_search_{}", &simple[..8]);
        let (created, version) = client.create_saved_search(&search_name, &conditions).await?;

        let Some(search_key) = created.first_key().map(str::to_string) else {
            return Err(ToolError::internal(format!(
                "Error creating saved search: {}",
                created.failure_summary()
            )));
        };

        let mut query = ItemQuery::new().limit(Some(params.limit));
        if let Some(sort_by) = &params.sort_by {
            query = query.sort(sort_by, params.sort_direction);
        }
        let results = client.saved_search_items(&search_key, &query).await;

        if let Err(e) = client.delete_saved_searches(&[search_key.clone()], version).await {
            tracing::warn!(search_key = %search_key, error = %e, "Failed to delete temporary saved search");
        }

        let items = results?;
        if items.is_empty() {
            return Ok("No items found matching the search criteria.".to_string());
        }

        let mut output = vec![
            "# Advanced Search Results".to_string(),
            String::new(),
            format!("Found {} items matching the search criteria:", items.len()),
            String::new(),
            "## Search Criteria".to_string(),
            format!("Join mode: {}", params.join_mode.as_str().to_uppercase()),
        ];
        for (i, condition) in params.conditions.iter().enumerate() {
            output.push(Self::criteria_line(i + 1, condition));
        }
        output.push(String::new());
        output.push("## Results".to_string());

        let style = ListStyle { heading_level: 3, abstract_chars: Some(150), ..ListStyle::SEARCH };
        output.extend(format_item_list(&items, style));

        Ok(output.join("\n"))
    }
}

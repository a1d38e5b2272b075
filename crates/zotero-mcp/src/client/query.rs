//! Query parameters for item listings.

use crate::models::{QueryMode, SortDirection};

/// Filters and ordering for `/items`-style listings.
///
/// Paging (`start` / `limit`) is handled by the client; `limit` here is the total wanted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    /// Quick-search text.
    pub q: Option<String>,
    /// Quick-search mode.
    pub qmode: Option<QueryMode>,
    /// Item type filter (supports `-type` and `a || b`).
    pub item_type: Option<String>,
    /// Tag filters, ANDed; each supports `a || b` and `-tag`.
    pub tags: Vec<String>,
    /// Total number of items wanted; all when `None`.
    pub limit: Option<u32>,
    /// Sort field.
    pub sort: Option<String>,
    /// Sort direction.
    pub direction: Option<SortDirection>,
}

impl ItemQuery {
    /// Empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quick-search text.
    #[must_use]
    pub fn q(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Set the quick-search mode.
    #[must_use]
    pub const fn qmode(mut self, qmode: QueryMode) -> Self {
        self.qmode = Some(qmode);
        self
    }

    /// Set the item type filter.
    #[must_use]
    pub fn item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    /// Add a tag filter.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the total limit.
    #[must_use]
    pub const fn limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Set sort field and direction.
    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(field.into());
        self.direction = Some(direction);
        self
    }

    /// Query parameters, excluding paging.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(q) = &self.q {
            params.push(("q".to_string(), q.clone()));
        }
        if let Some(qmode) = self.qmode {
            params.push(("qmode".to_string(), qmode.as_str().to_string()));
        }
        if let Some(item_type) = &self.item_type {
            params.push(("itemType".to_string(), item_type.clone()));
        }
        for tag in &self.tags {
            params.push(("tag".to_string(), tag.clone()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort".to_string(), sort.clone()));
        }
        if let Some(direction) = self.direction {
            params.push(("direction".to_string(), direction.as_str().to_string()));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_repeat_tags_and_skip_limit() {
        let query = ItemQuery::new()
            .q("graph")
            .qmode(QueryMode::Everything)
            .item_type("-attachment")
            .tag("ml || ai")
            .tag("-draft")
            .limit(Some(5))
            .sort("dateAdded", SortDirection::Desc);

        let params = query.to_params();
        let tags: Vec<_> = params.iter().filter(|(k, _)| k == "tag").map(|(_, v)| v.as_str()).collect();
        assert_eq!(tags, vec!["ml || ai", "-draft"]);
        assert!(params.contains(&("qmode".to_string(), "everything".to_string())));
        assert!(params.contains(&("direction".to_string(), "desc".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "limit"));
    }
}

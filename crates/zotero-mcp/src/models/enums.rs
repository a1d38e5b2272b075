//! Enumeration types for API and tool parameters.

use serde::{Deserialize, Serialize};

/// Quick-search mode for `/items?q=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryMode {
    /// Match titles, creators and years.
    #[default]
    TitleCreatorYear,
    /// Match all fields and full-text content.
    Everything,
}

impl QueryMode {
    /// Value of the `qmode` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TitleCreatorYear => "titleCreatorYear",
            Self::Everything => "everything",
        }
    }
}

/// How saved-search conditions combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    /// Every condition must match.
    #[default]
    All,
    /// Any condition may match.
    Any,
}

impl JoinMode {
    /// Operator value of the `joinMode` pseudo-condition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Value of the `direction` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mode_wire_names() {
        let mode: QueryMode = serde_json::from_str("\"everything\"").unwrap();
        assert_eq!(mode, QueryMode::Everything);
        assert_eq!(serde_json::to_string(&QueryMode::TitleCreatorYear).unwrap(), "\"titleCreatorYear\"");
    }

    #[test]
    fn test_join_mode_default_is_all() {
        assert_eq!(JoinMode::default().as_str(), "all");
        assert_eq!(SortDirection::Desc.as_str(), "desc");
    }
}

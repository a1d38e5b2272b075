//! Configuration for the Zotero MCP server.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Zotero Web API.
    pub const WEB_API: &str = "https://api.zotero.org";

    /// Base URL for the local API served by Zotero 7 desktop.
    pub const LOCAL_API: &str = "http://localhost:23119/api";

    /// Zotero API version sent with every request.
    pub const API_VERSION: &str = "3";

    /// Library id used by the local API for the signed-in user.
    pub const LOCAL_LIBRARY_ID: &str = "0";

    /// Request timeout (file downloads can be large).
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Retries for transient failures.
    pub const MAX_RETRIES: u32 = 3;

    /// Largest page the API returns per request.
    pub const PAGE_SIZE: u32 = 100;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Kind of Zotero library the id refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LibraryType {
    /// Personal library (`/users/{id}`).
    #[default]
    User,
    /// Group library (`/groups/{id}`).
    Group,
}

impl LibraryType {
    /// URL path segment for this library type.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Group => "groups",
        }
    }

    /// Name used in configuration files and environment variables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
        }
    }
}

impl FromStr for LibraryType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "users" => Ok(Self::User),
            "group" | "groups" => Ok(Self::Group),
            other => Err(ConfigError::InvalidLibraryType(other.to_string())),
        }
    }
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    /// Zotero library id (user id or group id).
    pub library_id: Option<String>,

    /// Personal or group library.
    pub library_type: LibraryType,

    /// Zotero API key (required for the Web API).
    pub api_key: Option<String>,

    /// Talk to the local Zotero desktop API instead of api.zotero.org.
    pub local: bool,

    /// Base URL (overridable for testing with mock servers).
    pub api_base_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Retries for transient failures.
    pub max_retries: u32,
}

impl Config {
    /// Create a configuration for the Web API or the local API.
    #[must_use]
    pub fn new(
        library_id: Option<String>,
        library_type: LibraryType,
        api_key: Option<String>,
        local: bool,
    ) -> Self {
        Self {
            library_id: library_id.filter(|s| !s.trim().is_empty()),
            library_type,
            api_key: api_key.filter(|s| !s.trim().is_empty()),
            local,
            api_base_url: if local { api::LOCAL_API } else { api::WEB_API }.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            max_retries: api::MAX_RETRIES,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            library_id: Some("12345".to_string()),
            library_type: LibraryType::User,
            api_key: Some("test-key".to_string()),
            local: false,
            api_base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            max_retries: 0, // No retries in tests
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `ZOTERO_LIBRARY_ID`, `ZOTERO_LIBRARY_TYPE`, `ZOTERO_API_KEY` and `ZOTERO_LOCAL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let library_id = std::env::var("ZOTERO_LIBRARY_ID").ok();
        let library_type = match std::env::var("ZOTERO_LIBRARY_TYPE") {
            Ok(value) => value.parse()?,
            Err(_) => LibraryType::User,
        };
        let api_key = std::env::var("ZOTERO_API_KEY").ok();
        let local = std::env::var("ZOTERO_LOCAL").is_ok_and(|v| parse_flag(&v));

        Ok(Self::new(library_id, library_type, api_key, local))
    }

    /// Check that the configuration can reach a library.
    ///
    /// Remote mode needs both a library id and an API key. Local mode needs neither.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.local && (self.library_id.is_none() || self.api_key.is_none()) {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(())
    }

    /// Library id, defaulting to the local user in local mode.
    #[must_use]
    pub fn effective_library_id(&self) -> &str {
        self.library_id.as_deref().unwrap_or(api::LOCAL_LIBRARY_ID)
    }

    /// Library URL prefix, e.g. `https://api.zotero.org/users/12345`.
    #[must_use]
    pub fn library_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.api_base_url,
            self.library_type.path_segment(),
            self.effective_library_id()
        )
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, LibraryType::User, None, true)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("library_id", &self.library_id)
            .field("library_type", &self.library_type)
            .field("has_api_key", &self.has_api_key())
            .field("local", &self.local)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Parse a boolean-ish environment flag (`true`, `yes`, `1`).
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_requires_credentials() {
        let config = Config::new(Some("123".into()), LibraryType::User, None, false);
        assert_eq!(config.validate(), Err(ConfigError::MissingCredentials));

        let config = Config::new(None, LibraryType::User, Some("key".into()), false);
        assert_eq!(config.validate(), Err(ConfigError::MissingCredentials));

        let config = Config::new(Some("123".into()), LibraryType::User, Some("key".into()), false);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_credentials_count_as_missing() {
        let config = Config::new(Some("  ".into()), LibraryType::User, Some(String::new()), false);
        assert!(config.library_id.is_none());
        assert!(!config.has_api_key());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_config_defaults_library_id() {
        let config = Config::new(None, LibraryType::User, None, true);
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_library_id(), "0");
        assert_eq!(config.library_url(), "http://localhost:23119/api/users/0");
    }

    #[test]
    fn test_group_library_url() {
        let config = Config::new(Some("999".into()), LibraryType::Group, Some("k".into()), false);
        assert_eq!(config.library_url(), "https://api.zotero.org/groups/999");
    }

    #[test]
    fn test_library_type_parse() {
        assert_eq!("user".parse::<LibraryType>(), Ok(LibraryType::User));
        assert_eq!("Group".parse::<LibraryType>(), Ok(LibraryType::Group));
        assert!("team".parse::<LibraryType>().is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("YES"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = Config::new(Some("1".into()), LibraryType::User, Some("secret".into()), false);
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("has_api_key"));
    }
}

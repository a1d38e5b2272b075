//! Error types for the Zotero MCP server.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Configuration problems detected before any request is made.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Remote mode needs both a library id and an API key.
    #[error(
        "Missing Zotero credentials. Set ZOTERO_LIBRARY_ID and ZOTERO_API_KEY, \
         or use ZOTERO_LOCAL=true for a local Zotero instance."
    )]
    MissingCredentials,

    /// Library type other than `user` or `group`.
    #[error("Invalid library type '{0}' (expected 'user' or 'group')")]
    InvalidLibraryType(String),

    /// API key cannot be sent as an HTTP header value.
    #[error("API key contains characters that are not valid in an HTTP header")]
    InvalidApiKey,
}

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Client could not be built from the configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the Zotero API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// API key lacks access to the library (403 response)
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message from API
        message: String,
    },

    /// Library changed since the version we sent (412 response)
    #[error("Precondition failed: {message}")]
    PreconditionFailed {
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Local filesystem error while storing a download
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is a 404 from the API.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failures of the format conversion routine.
#[derive(thiserror::Error, Debug)]
pub enum ConversionError {
    /// No extractor for this kind of file.
    #[error("unsupported content type '{0}'")]
    Unsupported(String),

    /// Extraction succeeded but produced no text.
    #[error("no text could be extracted")]
    Empty,

    /// PDF parser failure.
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// File could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Blocking worker panicked or was cancelled.
    #[error("conversion worker failed: {0}")]
    Worker(String),

    /// Converter-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Stage failures inside the full-text pipeline.
///
/// None of these escape the resolver; each is routed to the next stage or rendered as text.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Full-text index query failed or returned nothing usable.
    #[error("index lookup failed: {0}")]
    IndexLookup(String),

    /// File transfer failed.
    #[error("{0}")]
    Download(ClientError),

    /// Transfer reported success but no file is at the expected path.
    #[error("file missing after download: {0}")]
    MissingFile(std::path::PathBuf),
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Error from the API client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// Input validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal tool logic error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Convert to a user-friendly error message for MCP response.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Client(ClientError::RateLimited { retry_after }) => {
                format!(
                    "Rate limited by the Zotero API. Please wait {:?} before retrying.",
                    retry_after
                )
            }
            Self::Client(ClientError::NotFound { resource }) => {
                format!("Not found: {resource}. Please check the key is correct.")
            }
            Self::Client(ClientError::Config(err)) => format!("Error: {err}"),
            Self::Validation { field, message } => {
                format!("Error: invalid input for '{field}': {message}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

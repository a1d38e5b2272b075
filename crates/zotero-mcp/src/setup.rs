//! Claude Desktop configuration writer.
//!
//! Registers this executable as the `zotero` MCP server in `claude_desktop_config.json`,
//! leaving every other entry in the file untouched.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::config::LibraryType;

/// Name of the server entry under `mcpServers`.
pub const SERVER_KEY: &str = "zotero";

/// Config file name inside the Claude Desktop config directory.
pub const CONFIG_FILE: &str = "claude_desktop_config.json";

/// Errors while writing the Claude Desktop configuration.
#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    /// No per-user config directory on this platform.
    #[error("could not determine the Claude Desktop config directory; pass --config-path")]
    NoConfigDir,

    /// The running executable could not be located.
    #[error("could not locate the zotero-mcp executable: {0}")]
    Executable(std::io::Error),

    /// Reading or writing the config file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Serializing the updated config failed.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What to write into the server entry.
#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    /// Use the local desktop API.
    pub local: bool,
    /// Web API key.
    pub api_key: Option<String>,
    /// Web API library id.
    pub library_id: Option<String>,
    /// Web API library type.
    pub library_type: Option<LibraryType>,
    /// Explicit config file location.
    pub config_path: Option<PathBuf>,
}

/// Result of a successful setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    /// Executable written as the server command.
    pub command: PathBuf,
    /// Config file that was written.
    pub config_path: PathBuf,
    /// Things the user still has to do.
    pub warnings: Vec<String>,
}

/// Default Claude Desktop config location for this platform.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("Claude").join(CONFIG_FILE))
}

/// The `mcpServers.zotero` entry.
#[must_use]
pub fn server_entry(command: &Path, options: &SetupOptions) -> Value {
    let mut env = Map::new();
    env.insert("ZOTERO_LOCAL".to_string(), json!(if options.local { "true" } else { "false" }));

    if !options.local {
        if let Some(key) = &options.api_key {
            env.insert("ZOTERO_API_KEY".to_string(), json!(key));
        }
        if let Some(id) = &options.library_id {
            env.insert("ZOTERO_LIBRARY_ID".to_string(), json!(id));
        }
        if let Some(library_type) = options.library_type {
            env.insert("ZOTERO_LIBRARY_TYPE".to_string(), json!(library_type.as_str()));
        }
    }

    json!({
        "command": command.to_string_lossy(),
        "env": env,
    })
}

/// Insert or replace the server entry in an existing config document.
#[must_use]
pub fn upsert_server(existing: Value, entry: Value) -> Value {
    let mut root = match existing {
        Value::Object(map) => map,
        other => {
            tracing::warn!(found = %other, "Config root is not an object, starting fresh");
            Map::new()
        }
    };

    let servers = root.entry("mcpServers").or_insert_with(|| Value::Object(Map::new()));
    if !servers.is_object() {
        *servers = Value::Object(Map::new());
    }
    if let Value::Object(servers) = servers {
        servers.insert(SERVER_KEY.to_string(), entry);
    }

    Value::Object(root)
}

/// Read the config file; a missing file is an empty config and invalid JSON is replaced.
fn load_config(path: &Path) -> Result<Value, SetupError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(json!({})),
        Err(source) => return Err(SetupError::Io { path: path.to_path_buf(), source }),
    };

    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Config file is not valid JSON, creating a new one");
            Ok(json!({}))
        }
    }
}

/// Write the server entry for `command` into the config at `path`.
pub fn update_claude_config(path: &Path, command: &Path, options: &SetupOptions) -> Result<(), SetupError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|source| SetupError::Io { path: parent.to_path_buf(), source })?;
    }

    let updated = upsert_server(load_config(path)?, server_entry(command, options));
    let text = serde_json::to_string_pretty(&updated)?;

    std::fs::write(path, text).map_err(|source| SetupError::Io { path: path.to_path_buf(), source })
}

/// Register the running executable with Claude Desktop.
pub fn run_setup(options: &SetupOptions) -> Result<SetupReport, SetupError> {
    let command = std::env::current_exe().map_err(SetupError::Executable)?;
    let config_path = match &options.config_path {
        Some(path) => path.clone(),
        None => default_config_path().ok_or(SetupError::NoConfigDir)?,
    };

    update_claude_config(&config_path, &command, options)?;
    tracing::info!(path = %config_path.display(), "Updated Claude Desktop config");

    let mut warnings = Vec::new();
    if !options.local {
        if options.api_key.is_none() {
            warnings.push(
                "Using the Web API requires a Zotero API key. Add ZOTERO_API_KEY to your environment."
                    .to_string(),
            );
        }
        if options.library_id.is_none() {
            warnings.push(
                "Using the Web API requires a Zotero library ID. Add ZOTERO_LIBRARY_ID to your environment."
                    .to_string(),
            );
        }
    }

    Ok(SetupReport { command, config_path, warnings })
}

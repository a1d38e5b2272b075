//! Zotero MCP Server
//!
//! A Model Context Protocol (MCP) server for Zotero libraries, backed by the Zotero Web API or
//! the local API of Zotero 7 desktop. Lets LLM agents search a library, read metadata and full
//! text, browse collections and notes, and edit tags.
//!
//! # Features
//!
//! - **15 MCP Tools**: search, metadata, full text, collections, tags, notes, annotations
//! - **Full-text fallback**: indexed text first, otherwise the best attachment is downloaded and
//!   converted locally
//! - **Async-first**: Built on Tokio with transparent paging
//! - **Retrying client**: exponential backoff on transient failures
//!
//! # Example
//!
//! ```no_run
//! use zotero_mcp::{ZoteroClient, config::Config, convert::MarkdownConverter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = ZoteroClient::from_config(&config)?;
//!
//!     let text = zotero_mcp::fulltext::resolve_fulltext(&client, Arc::new(MarkdownConverter), "ABCD2345").await;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```

pub mod attachments;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod formatters;
pub mod fulltext;
pub mod models;
pub mod server;
pub mod setup;
pub mod tools;

pub use client::ZoteroClient;
pub use config::Config;
pub use error::{ClientError, ToolError};

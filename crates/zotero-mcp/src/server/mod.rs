//! MCP server implementation.
//!
//! Provides both stdio (for Claude Desktop) and HTTP transports over a shared JSON-RPC
//! dispatcher.

pub mod http;
pub mod protocol;
pub mod stdio;

use crate::tools::{self, McpTool, ToolContext};

/// MCP server for a Zotero library.
pub struct McpServer {
    /// Tool execution context.
    ctx: ToolContext,

    /// Registered tools.
    tools: Vec<Box<dyn McpTool>>,
}

impl McpServer {
    /// Create a new MCP server.
    #[must_use]
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx, tools: tools::register_all_tools() }
    }

    /// Run the server in stdio mode (for Claude Desktop).
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server in stdio mode");
        tracing::info!("Registered {} tools", self.tools.len());

        stdio::run_stdio(self.tools, self.ctx).await
    }

    /// Run the server in HTTP mode.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run_http(self, host: &str, port: u16) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server in HTTP mode on {}:{}", host, port);
        tracing::info!("Registered {} tools", self.tools.len());

        let router = http::create_router(self.tools, self.ctx);
        let listener = tokio::net::TcpListener::bind((host, port)).await?;

        tracing::info!("HTTP server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("tools", &self.tools.len()).finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}

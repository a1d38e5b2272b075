//! Zotero MCP Server - Entry Point
//!
//! Provides both stdio (for Claude Desktop) and HTTP transports, plus a `setup` command that
//! registers the server with Claude Desktop.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use zotero_mcp::config::{Config, LibraryType, parse_flag};
use zotero_mcp::server::McpServer;
use zotero_mcp::setup::{self, SetupOptions};
use zotero_mcp::tools::ToolContext;

#[derive(Parser, Debug)]
#[command(name = "zotero-mcp")]
#[command(about = "MCP server for Zotero libraries")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server (default)
    Serve(ServeArgs),
    /// Register zotero-mcp in the Claude Desktop config
    Setup(SetupArgs),
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio")]
    transport: Transport,

    /// HTTP bind host (only used with --transport http)
    #[arg(long, default_value = "localhost")]
    host: String,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Zotero library id (user or group id)
    #[arg(long, env = "ZOTERO_LIBRARY_ID")]
    library_id: Option<String>,

    /// Library type: user or group
    #[arg(long, default_value = "user", env = "ZOTERO_LIBRARY_TYPE")]
    library_type: LibraryType,

    /// Zotero API key (required for the Web API)
    #[arg(long, env = "ZOTERO_API_KEY")]
    api_key: Option<String>,

    /// Use the local Zotero desktop API (also enabled by ZOTERO_LOCAL=true)
    #[arg(long)]
    local: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Args, Debug)]
struct SetupArgs {
    /// Configure for the Zotero Web API instead of the local API
    #[arg(long)]
    no_local: bool,

    /// Zotero API key (only needed with --no-local)
    #[arg(long)]
    api_key: Option<String>,

    /// Zotero library id (only needed with --no-local)
    #[arg(long)]
    library_id: Option<String>,

    /// Library type (only needed with --no-local)
    #[arg(long, default_value = "user")]
    library_type: LibraryType,

    /// Path to the Claude Desktop config file
    #[arg(long)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output (for Claude Desktop)
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
}

/// Logs always go to stderr; stdout carries the stdio protocol.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Setup(args)) => run_setup(args),
        Some(Command::Serve(args)) => serve(args).await,
        None => serve(cli.serve).await,
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    init_tracing(&args.log_level, args.json_logs);

    let local = args.local || std::env::var("ZOTERO_LOCAL").is_ok_and(|v| parse_flag(&v));
    let config = Config::new(args.library_id, args.library_type, args.api_key, local);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?args.transport,
        local = config.local,
        library_type = %config.library_type,
        "Starting Zotero MCP server"
    );

    let server = McpServer::new(ToolContext::new(config));

    match args.transport {
        Transport::Stdio => server.run_stdio().await?,
        Transport::Http => server.run_http(&args.host, args.port).await?,
    }

    Ok(())
}

fn run_setup(args: SetupArgs) -> anyhow::Result<()> {
    init_tracing("warn", false);

    let local = !args.no_local;
    let options = SetupOptions {
        local,
        api_key: args.api_key,
        library_id: args.library_id,
        library_type: (!local).then_some(args.library_type),
        config_path: args.config_path,
    };

    let report = setup::run_setup(&options)?;

    println!("Found zotero-mcp at: {}", report.command.display());
    println!("Configuration updated at: {}", report.config_path.display());
    for warning in &report.warnings {
        println!("Warning: {warning}");
    }

    println!("\nSetup complete!");
    println!("\nTo use Zotero in Claude Desktop:");
    println!("1. Restart Claude Desktop if it's running");
    println!("2. The Zotero tools appear in the tools menu of a new conversation");

    if local {
        println!("\nNote: Make sure Zotero desktop is running and the local API is enabled in preferences.");
    }

    Ok(())
}

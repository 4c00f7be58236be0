//! Kanban MCP adapter binary.
//!
//! Speaks MCP over stdio. Logs go to stderr so stdout stays a clean
//! protocol channel.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use kanban::config::{default_db_path, ensure_parent_dir};
use kanban::db::{Database, DbError, SqliteDatabase};
use kanban::mcp::{self, McpServer};
use kanban::upstream::{UpstreamClient, UpstreamError};
use miette::Diagnostic;
use rmcp::{ServiceExt, transport::stdio};
use thiserror::Error;
use tracing::info;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Database error: {0}")]
    #[diagnostic(code(kanban::binary::database))]
    Database(#[from] DbError),

    #[error("I/O error: {0}")]
    #[diagnostic(code(kanban::binary::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("MCP transport error: {0}")]
    #[diagnostic(code(kanban::binary::transport))]
    Transport(String),
}

#[derive(Parser)]
#[command(name = "kanban-mcp")]
#[command(author, version, about = "Kanban MCP adapter (stdio)", long_about = None)]
struct Cli {
    /// Database file path, shared with the API server
    #[arg(long, env = "KANBAN_DB")]
    db: Option<PathBuf>,

    /// Send create_task to this API server instead of writing directly
    #[arg(long, env = "KANBAN_API_URL")]
    api_url: Option<String>,

    /// Upper bound for each request to the API server
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Apply schema migrations on startup (normally the API server does this)
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    mcp::init_tracing();
    run(Cli::parse()).await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), BinaryError> {
    let db_path = cli.db.unwrap_or_else(default_db_path);
    ensure_parent_dir(&db_path)?;

    info!(path = %db_path.display(), "opening database");
    let db = SqliteDatabase::open(&db_path).await?;
    if cli.migrate {
        db.migrate().await?;
    }

    let upstream = cli
        .api_url
        .map(|url| UpstreamClient::new(url, Duration::from_secs(cli.timeout_secs)))
        .transpose()?;
    match &upstream {
        Some(client) => info!(api_url = client.base_url(), "delegating create_task"),
        None => info!("writing directly to the shared database"),
    }

    let service = McpServer::<SqliteDatabase>::new(db, upstream)
        .serve(stdio())
        .await
        .map_err(|e| BinaryError::Transport(e.to_string()))?;
    service
        .waiting()
        .await
        .map_err(|e| BinaryError::Transport(e.to_string()))?;

    Ok(())
}

//! Kanban API server binary.
//!
//! This binary creates the concrete database implementation and passes it
//! to the API server. The API layer remains agnostic of the storage backend.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use kanban::api::{self, Config};
use kanban::config::{default_db_path, ensure_parent_dir};
use kanban::db::{Database, DbError, SqliteDatabase};
use miette::Diagnostic;
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
}

#[derive(Parser)]
#[command(name = "kanban-api")]
#[command(author, version, about = "Kanban API server", long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Database file path (defaults to ~/.local/share/kanban/kanban.db)
    #[arg(long, env = "KANBAN_DB")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    api::init_tracing();
    run(Cli::parse()).await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), BinaryError> {
    let db_path = cli.db.unwrap_or_else(default_db_path);
    ensure_parent_dir(&db_path)?;

    info!(path = %db_path.display(), "opening database");
    let db = SqliteDatabase::open(&db_path).await?;

    // Run migrations before starting the server
    db.migrate().await?;
    info!("database migrations complete");

    api::run(
        Config {
            host: cli.host,
            port: cli.port,
        },
        db,
    )
    .await?;

    Ok(())
}

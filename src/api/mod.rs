//! Kanban API server.
//!
//! axum router over the shared SQLite store. Writes require an entity's
//! `X-API-Key`; reads and registration are open.

mod auth;
mod error;
pub mod handlers;
mod routes;
mod state;


use std::net::{IpAddr, Ipv4Addr};

use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use auth::{API_KEY_HEADER, AuthenticatedEntity};
pub use error::{ApiError, ErrorResponse};
pub use handlers::CreateTaskRequest;
pub use routes::{ApiDoc, create_router};
pub use state::AppState;

use crate::db::Database;

/// API server configuration
pub struct Config {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
        }
    }
}

/// Initialize tracing subscriber with env filter
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kanban=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Serve the API on `config.host:config.port` until the process exits.
pub async fn run<D: Database + 'static>(config: Config, db: D) -> std::io::Result<()> {
    let app = create_router(AppState::<D>::new(db)).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app).await
}

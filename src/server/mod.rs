//! HTTP server startup

pub mod db;

use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::http::http_router;
use crate::state::AppState;

pub use db::{create_memory_pool, create_optimized_pool, run_migrations};

/// Serve the API on `bind_address` until Ctrl-C.
pub async fn serve(app_state: Arc<AppState>, bind_address: &str) -> Result<()> {
    let app = http_router(app_state);
    let listener = TcpListener::bind(bind_address).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

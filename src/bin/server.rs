//! HTTP API server entry point

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use soldscope::infrastructure::config::ConfigManager;
use soldscope::infrastructure::logging::init_logging;
use soldscope::server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigManager::default().load_or_default().await?;
    init_logging(&config.logging, true)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config: Arc::new(config),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

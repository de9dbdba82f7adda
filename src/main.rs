use std::sync::Arc;

use anyhow::Context;
use moodchick::{config::AppConfig, logging, server, spawn_cleanup, CaptionService, FixedWindowLimiter};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = AppConfig::from_env().context("loading configuration")?;

    let limiter = Arc::new(FixedWindowLimiter::per_minute(config.rate_limit.requests_per_window));
    let cleanup = spawn_cleanup(limiter.clone(), config.rate_limit.cleanup_interval);

    let captions = CaptionService::new(config.caption.clone()).context("building provider client")?;
    if captions.is_configured() {
        tracing::info!(api_url = %config.caption.api_url, "caption provider configured");
    } else {
        tracing::warn!("HUGGINGFACE_API_KEY not set; serving fallback captions only");
    }

    let app = server::router(captions, limiter);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("binding {}:{}", config.server.host, config.server.port))?;
    tracing::info!(addr = %listener.local_addr()?, "server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    cleanup.abort();
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}

//! HTTP Server implementation

use anyhow::{Context, Result};
use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tracing::info;

use insight_api::{create_router, ChatService};
use insight_core::ServerConfig;

pub struct Server {
    config: ServerConfig,
    service: ChatService,
}

impl Server {
    pub fn new(config: ServerConfig, service: ChatService) -> Self {
        Self { config, service }
    }

    pub async fn run(self) -> Result<()> {
        let addr = self.config.address();
        let app = build_http_router(self.service);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;

        info!("HTTP server listening on {}", addr);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}

fn build_http_router(service: ChatService) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(create_router(service))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "InsightFlow",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root_handler() {
        let response = root().await;
        assert_eq!(response.0["service"], "InsightFlow");
        assert_eq!(response.0["status"], "running");
    }
}

//! Application state and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use insight_api::ChatService;
use insight_core::AppConfig;
use insight_data::PgDataAccess;
use insight_narrative::{GeminiClient, LlmNarrator, NarrativeGenerator};
use insight_nlp::{Catalog, NlpEngineImpl};

use crate::cli::Args;
use crate::server::Server;

/// Loads configuration, applying command-line overrides.
pub fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::load().context("Failed to load configuration")?,
    };

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    Ok(config)
}

/// Wires the classifier, data access and narrator into a chat service.
///
/// The database pool connects lazily, so the server starts even when the
/// database is down. Without an API key the service runs but reports the
/// AI engine as unavailable.
pub fn build_service(config: &AppConfig) -> Result<ChatService> {
    let catalog = match &config.nlp.catalog_path {
        Some(path) => {
            info!("Loading catalog from {}", path.display());
            Catalog::from_yaml_file(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display()))?
        }
        None => Catalog::builtin(),
    };
    let engine = Arc::new(NlpEngineImpl::with_catalog(Arc::new(catalog)));

    let data = PgDataAccess::connect_lazy(&config.database)
        .context("Failed to configure database pool")?;

    let service = ChatService::new(engine, Arc::new(data));

    match GeminiClient::from_config(&config.llm) {
        Ok(client) => {
            info!("AI engine: {} ({})", config.llm.provider, client.model());
            let narrator: Arc<dyn NarrativeGenerator> = Arc::new(LlmNarrator::new(client));
            Ok(service.with_narrator(narrator))
        }
        Err(err) => {
            warn!("AI engine disabled: {}", err);
            Ok(service)
        }
    }
}

/// Main application
pub struct App {
    config: AppConfig,
    service: ChatService,
}

impl App {
    /// Build the application with all dependencies
    pub async fn build(args: Args) -> Result<Self> {
        args.validate().context("Invalid command line arguments")?;

        let config = load_config(&args)?;
        let service = build_service(&config)?;

        Ok(Self { config, service })
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        info!("Starting server on {}", self.config.server.address());

        let server = Server::new(self.config.server, self.service);
        server.run().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_build_service_without_api_key() {
        let mut config = AppConfig::load_from_env("INSIGHT_APP_TEST_UNSET").unwrap();
        config.llm.api_key = String::new();

        let service = build_service(&config).unwrap();
        assert!(!service.is_available());
    }

    #[tokio::test]
    async fn test_build_service_with_api_key() {
        let mut config = AppConfig::load_from_env("INSIGHT_APP_TEST_UNSET").unwrap();
        config.llm.api_key = "test-key".to_string();

        let service = build_service(&config).unwrap();
        assert!(service.is_available());
    }

    #[test]
    fn test_port_override() {
        let args = Args::parse_from(["insight-server", "--port", "6001", "--host", "127.0.0.1"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.server.address(), "127.0.0.1:6001");
    }
}

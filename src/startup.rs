use crate::components::credentials::{
    CredentialProvider, RedisTokenStore, StaticCredentialProvider,
};
use crate::components::graph::GraphClient;
use crate::components::{CalendarEventsClient, DateProvider, EmailSearchClient, ToolRegistry};
use crate::config::Config;
use crate::error::{Error, ToolResult};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Pick the credential provider: a static token when one is configured, the Redis store otherwise
pub fn credential_provider(config: &Config) -> ToolResult<Arc<dyn CredentialProvider>> {
    match &config.access_token {
        Some(token) => {
            info!("Using static access token for connection {}", config.connection_id);
            Ok(Arc::new(
                StaticCredentialProvider::new().with_token(&config.connection_id, token),
            ))
        }
        None => {
            info!("Using Redis token store at {}", config.redis_url);
            Ok(Arc::new(RedisTokenStore::new(config)?))
        }
    }
}

/// Register every enabled tool
pub fn build_registry(config: &Config, credentials: Arc<dyn CredentialProvider>) -> ToolRegistry {
    let graph = GraphClient::new(config);
    let mut registry = ToolRegistry::new();

    registry.register_if_enabled(config, DateProvider::new());
    registry.register_if_enabled(
        config,
        EmailSearchClient::new(graph.clone(), Arc::clone(&credentials), &config.connection_id),
    );
    registry.register_if_enabled(
        config,
        CalendarEventsClient::new(graph, credentials, &config.connection_id),
    );

    registry
}

//! Case Reasoning HTTP server.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use case_reasoning::adapters::ai::{MockAIProvider, OpenAIProvider};
use case_reasoning::adapters::http::{api_router, AppState, EngineParts};
use case_reasoning::adapters::InMemoryCaseStore;
use case_reasoning::config::{AiProvider, AppConfig, ValidationError};
use case_reasoning::ports::AIProvider;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_provider(config: &AppConfig) -> Result<Arc<dyn AIProvider>, Box<dyn std::error::Error>> {
    match config.ai.provider {
        AiProvider::Mock => Ok(Arc::new(MockAIProvider::demo())),
        AiProvider::OpenAI => {
            let openai = config
                .ai
                .openai()
                .ok_or(ValidationError::MissingRequired("OPENAI_API_KEY"))?;
            Ok(Arc::new(OpenAIProvider::new(openai)?))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let catalog = Arc::new(config.catalog.load()?);
    let store = Arc::new(InMemoryCaseStore::seeded()?);
    let provider = build_provider(&config)?;
    tracing::info!(
        "Using {} provider ({})",
        provider.provider_info().name,
        provider.provider_info().model
    );

    let mut parts = EngineParts::new(store, catalog, provider);
    parts.policy = config.screening.policy()?;
    parts.run_config = config.pipeline.run_config();
    parts.agents = config.ai.agents();
    parts.chat = config.ai.chat();
    let state = AppState::build(parts)?;

    let app = api_router(state, &config.server.http_settings());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}

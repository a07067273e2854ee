mod configuration;
mod error;
mod routes;
mod state;

use std::sync::Arc;
use toolrelay::{agent::Agent, providers::ollama::OllamaProvider, tools::ToolRegistry};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading any configuration
    dotenv::dotenv().ok();

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let settings = configuration::Settings::new()?;
    let addr = settings.server.socket_addr()?;

    let model_config = settings.model.into_config();
    info!(host = %model_config.host, model = %model_config.model, "using ollama backend");
    let provider = Box::new(OllamaProvider::new(model_config)?);
    let registry = Arc::new(ToolRegistry::commerce());

    let agent = match &settings.agent.system_prompt_file {
        Some(path) => Agent::from_prompt_file(provider, registry, path)?,
        None => Agent::new(provider, registry)?,
    };

    // Create app state and router
    let state = state::AppState::new(agent);
    let app = routes::configure(state);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Agent server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

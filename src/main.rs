use clap::Parser;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use querycraft::config::{AppConfig, CliArgs};
use querycraft::llm::LlmManager;
use querycraft::util::logging::init_tracing;
use querycraft::web;
use querycraft::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A .env file is optional, the process environment may already carry the key
    let dotenv = dotenvy::dotenv();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&AppConfig::default().logging);
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to read .env file: {}", e),
    }

    // Select a model up front; failure only disables conversion
    info!("Initializing LLM manager with backend: {}", config.llm.backend);
    let llm_manager = LlmManager::new(&config.llm);
    match llm_manager.generator().await {
        Ok(generator) => info!("Using model {}", generator.model_name()),
        Err(e) => error!("Conversion unavailable until the connection is retried: {}", e),
    }

    let app_state = Arc::new(AppState::new(config.clone(), llm_manager));

    // Start the web server
    info!("Starting QueryCraft server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod movie;
pub mod server;

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use config::Config;
use movie::MemoryRepository;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Seed error: {0}")]
    Seed(#[from] movie::SeedError),
    #[error("Server error: {0}")]
    Server(String),
}

/// Load the configuration, apply command line overrides and serve until the
/// listener fails.
pub async fn run(
    config_path: Option<&str>,
    port: Option<u16>,
    debug_logs: bool,
) -> Result<(), ServerError> {
    let config = Config::load_with(config_path, std::env::var("PORT").ok(), port)?;

    match config_path {
        Some(path) => info!("Using config file: {}", path),
        None => info!("No config file given, using defaults"),
    }
    if debug_logs {
        info!("Debug logging enabled");
    }

    serve(config).await
}

pub async fn serve(config: Config) -> Result<(), ServerError> {
    let repo = match config.seed.as_deref() {
        Some(path) => {
            info!("Loading movies from {}", path);
            MemoryRepository::from_seed_file(Path::new(path))?
        }
        None => MemoryRepository::bundled()?,
    };

    let addr = config.socket_addr()?;
    info!("Allowed origins: {}", config.cors.allowed_origins.join(", "));

    let state = server::AppState::new(config, Arc::new(repo));
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    info!("Serving HTTP on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;

    Ok(())
}

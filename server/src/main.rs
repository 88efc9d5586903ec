mod config;
mod db;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::services::storage::LocalBlobStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;

    tokio::fs::create_dir_all(&config.images.storage_dir).await?;
    let blobs = Arc::new(LocalBlobStore::new(config.images.storage_dir.clone()));
    tracing::info!(dir = %blobs.root().display(), "image storage ready");

    let state = state::AppState::new(pool, blobs, config.images);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, "courtmap listening");
    axum::serve(listener, app).await?;
    Ok(())
}

mod config;
mod constants;
mod handlers;
mod state;

use actix_web::{web, App, HttpServer};
use common::settings::describe_retention;
use config::ServerConfig;
use state::AppState;
use std::sync::Arc;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing with env filter
    // Filter out actix-server worker shutdown messages
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info")
                    .add_directive("actix_server::worker=warn".parse().unwrap())
                    .add_directive("actix_server::accept=warn".parse().unwrap())
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting LAN file server (PID: {})", std::process::id());

    let config = ServerConfig::load()?;

    let state = AppState::new(config.uploads_dir.clone(), config.io_timeout)
        .with_public_url(config.public_url.clone());

    state.storage.ensure_exists().await.map_err(|e| {
        error!("Failed to create upload directory {:?}: {}", config.uploads_dir, e);
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to create upload directory: {}", e),
        )
    })?;
    info!("Upload directory: {:?}", config.uploads_dir);

    let settings = state.settings.load().await;
    info!(
        "Old file cleanup: {}",
        describe_retention(settings.cleanup_after_minutes)
    );

    // Sweeps for the lifetime of the process
    let _sweeper = Arc::new(state.sweeper(config.sweep_interval)).spawn();

    let state = web::Data::new(state);
    let bind_address = config.bind_address();

    info!("Starting server on http://{}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(handlers::cors())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .map_err(|e| {
        error!("Failed to bind to {}: {}", bind_address, e);
        e
    })?;

    info!("Server bound successfully to http://{}", bind_address);
    info!("Open {} on other devices in the network", config.public_url);

    server.run().await
}

//! Local Library server
//!
//! Serves the catalog pages over HTTP.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locallibrary_server::{
    api,
    config::{AppConfig, StorageBackend},
    repository::{postgres::PgStore, Repository},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("locallibrary_server={},tower_http=debug", config.logging.level).into()
    });
    let json = config.logging.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .init();

    tracing::info!("Starting Local Library server v{}", env!("CARGO_PKG_VERSION"));

    let repository = match config.database.backend {
        StorageBackend::Postgres => {
            let store = PgStore::connect(&config.database)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            store
                .migrate()
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations completed");

            Repository::new(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; the catalog is lost on exit");
            Repository::in_memory()
        }
    };

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState::new(config, repository);
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

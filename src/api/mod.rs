//! HTTP layer: routes, page handlers, health and API docs

pub mod catalog;
pub mod health;
pub mod openapi;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    models::{Author, Book, BookInstance, Genre},
    views::Page,
    AppState,
};

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog = Router::new()
        .route("/", get(catalog::index))
        .merge(catalog::resource_routes::<Author>())
        .merge(catalog::resource_routes::<Genre>())
        .merge(catalog::resource_routes::<Book>())
        .merge(catalog::resource_routes::<BookInstance>());

    Router::new()
        .route("/", get(home))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/catalog", catalog)
        .with_state(state)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

async fn home() -> Page {
    Page::redirect("/catalog")
}

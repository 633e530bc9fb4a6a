//! Local Library catalog server
//!
//! Authors, genres, books and book copies with list, detail, create,
//! update and dependency-guarded delete pages, rendered as JSON views.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: Repository) -> Self {
        let services = services::Services::new(repository, &config.catalog);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}

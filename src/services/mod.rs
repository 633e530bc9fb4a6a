//! Business logic services

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod resource;

pub use catalog::CatalogService;
pub use resource::{FormMode, Resource};

use crate::{config::CatalogConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: CatalogService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, catalog_config: &CatalogConfig) -> Self {
        Self {
            catalog: CatalogService::new(repository, catalog_config),
        }
    }
}

//! Business logic services

pub mod books;
pub mod clock;

use std::sync::Arc;

use crate::{config::CatalogConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BookService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, catalog_config: &CatalogConfig) -> Self {
        Self {
            books: books::BookService::new(repository, catalog_config),
        }
    }

    /// Same as [`Services::new`] with an explicit time source
    pub fn with_clock(
        repository: Repository,
        catalog_config: &CatalogConfig,
        clock: Arc<dyn clock::Clock>,
    ) -> Self {
        Self {
            books: books::BookService::with_clock(repository, catalog_config, clock),
        }
    }
}

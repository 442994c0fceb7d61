//! Business logic services

pub mod auth;
pub mod catalog;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, CatalogConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services with the system clock and random tokens
    pub fn new(repository: Repository, auth_config: AuthConfig, catalog_config: CatalogConfig) -> Self {
        let tokens = auth::RandomTokenGenerator::new(auth_config.token_bytes);
        Self::with_sources(
            repository,
            auth_config,
            catalog_config,
            Arc::new(auth::SystemClock),
            Arc::new(tokens),
        )
    }

    /// Create all services with explicit time and token sources
    pub fn with_sources(
        repository: Repository,
        auth_config: AuthConfig,
        catalog_config: CatalogConfig,
        clock: Arc<dyn auth::Clock>,
        tokens: Arc<dyn auth::TokenGenerator>,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config, clock, tokens),
            catalog: catalog::CatalogService::new(repository, catalog_config.link_policy),
        }
    }
}

//! Catalog Server
//!
//! REST JSON API for a small library catalog: token-authenticated CRUD over
//! authors and books kept in a document store, with each side embedding
//! summaries of the other.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub store: Arc<dyn store::DocumentStore>,
}

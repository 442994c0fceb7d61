//! Repository layer over the document store

pub mod authors;
pub mod books;
pub mod users;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{error::AppResult, models::RecordState, store::{DocumentStore, Filter}};

/// Main repository struct holding the shared store client
#[derive(Clone)]
pub struct Repository {
    pub store: Arc<dyn DocumentStore>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository over the given store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(store.clone()),
            books: books::BooksRepository::new(store.clone()),
            users: users::UsersRepository::new(store.clone()),
            store,
        }
    }
}

/// Filter selecting records visible through normal queries
pub(crate) fn active() -> Filter {
    Filter::new().eq("state", RecordState::Active.as_str())
}

pub(crate) fn decode<T: DeserializeOwned>(document: Value) -> AppResult<T> {
    Ok(serde_json::from_value(document)?)
}

pub(crate) fn decode_all<T: DeserializeOwned>(documents: Vec<Value>) -> AppResult<Vec<T>> {
    documents.into_iter().map(decode).collect()
}

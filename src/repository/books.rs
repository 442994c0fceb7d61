//! Books repository

use std::sync::Arc;

use super::{active, decode, decode_all};
use crate::{
    error::{AppError, AppResult},
    models::{Book, RecordState},
    store::{DocumentStore, Filter, BOOKS},
};

pub const BOOK_NOT_FOUND: &str = "No se encontró el libro referenciado";

#[derive(Clone)]
pub struct BooksRepository {
    store: Arc<dyn DocumentStore>,
}

impl BooksRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// List all active books in insertion order
    pub async fn list_active(&self) -> AppResult<Vec<Book>> {
        let docs = self.store.find_many(BOOKS, &active()).await?;
        decode_all(docs)
    }

    /// Active book by id, if any
    pub async fn find_active(&self, id: &str) -> AppResult<Option<Book>> {
        self.store
            .find_one(BOOKS, &active().eq("_id", id))
            .await?
            .map(decode)
            .transpose()
    }

    /// Active book by id
    pub async fn get_active(&self, id: &str) -> AppResult<Book> {
        self.find_active(id)
            .await?
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))
    }

    pub async fn insert(&self, book: &Book) -> AppResult<()> {
        self.store
            .insert(BOOKS, &book.id, serde_json::to_value(book)?)
            .await
    }

    /// Overwrite the stored book with `id`
    pub async fn replace_by_id(&self, id: &str, book: &Book) -> AppResult<()> {
        let replaced = self
            .store
            .replace(BOOKS, id, serde_json::to_value(book)?)
            .await?;
        if !replaced {
            return Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()));
        }
        Ok(())
    }

    /// Mark an active book as deleted and return it
    pub async fn soft_delete(&self, id: &str) -> AppResult<Book> {
        let mut book = self.get_active(id).await?;
        book.state = RecordState::Deleted;
        self.replace_by_id(id, &book).await?;
        Ok(book)
    }

    /// Books of any state whose embedded authors include `author_id`
    pub async fn list_referencing_author(&self, author_id: &str) -> AppResult<Vec<Book>> {
        let filter = Filter::new().has_element("authors", "_id", author_id);
        let docs = self.store.find_many(BOOKS, &filter).await?;
        decode_all(docs)
    }
}

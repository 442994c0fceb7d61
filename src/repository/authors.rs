//! Authors repository

use std::sync::Arc;

use super::{active, decode, decode_all};
use crate::{
    error::{AppError, AppResult},
    models::{Author, RecordState},
    store::{DocumentStore, Filter, AUTHORS},
};

pub const AUTHOR_NOT_FOUND: &str = "No se encontró el autor referenciado";

#[derive(Clone)]
pub struct AuthorsRepository {
    store: Arc<dyn DocumentStore>,
}

impl AuthorsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// List all active authors in insertion order
    pub async fn list_active(&self) -> AppResult<Vec<Author>> {
        let docs = self.store.find_many(AUTHORS, &active()).await?;
        decode_all(docs)
    }

    /// Active author by id, if any
    pub async fn find_active(&self, id: &str) -> AppResult<Option<Author>> {
        self.store
            .find_one(AUTHORS, &active().eq("_id", id))
            .await?
            .map(decode)
            .transpose()
    }

    /// Active author by id
    pub async fn get_active(&self, id: &str) -> AppResult<Author> {
        self.find_active(id)
            .await?
            .ok_or_else(|| AppError::NotFound(AUTHOR_NOT_FOUND.to_string()))
    }

    pub async fn insert(&self, author: &Author) -> AppResult<()> {
        self.store
            .insert(AUTHORS, &author.id, serde_json::to_value(author)?)
            .await
    }

    /// Overwrite the stored author with `id`
    pub async fn replace_by_id(&self, id: &str, author: &Author) -> AppResult<()> {
        let replaced = self
            .store
            .replace(AUTHORS, id, serde_json::to_value(author)?)
            .await?;
        if !replaced {
            return Err(AppError::NotFound(AUTHOR_NOT_FOUND.to_string()));
        }
        Ok(())
    }

    /// Mark an active author as deleted and return it
    pub async fn soft_delete(&self, id: &str) -> AppResult<Author> {
        let mut author = self.get_active(id).await?;
        author.state = RecordState::Deleted;
        self.replace_by_id(id, &author).await?;
        Ok(author)
    }

    /// Authors of any state whose embedded books include `book_id`
    pub async fn list_referencing_book(&self, book_id: &str) -> AppResult<Vec<Author>> {
        let filter = Filter::new().has_element("books", "_id", book_id);
        let docs = self.store.find_many(AUTHORS, &filter).await?;
        decode_all(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, MockDocumentStore};
    use chrono::NaiveDate;

    fn author(id: &str) -> Author {
        Author {
            id: id.to_string(),
            fullname: format!("Author {}", id),
            birthdate: NaiveDate::from_ymd_opt(1950, 5, 17).unwrap(),
            books: Vec::new(),
            state: RecordState::Active,
        }
    }

    fn repository() -> AuthorsRepository {
        AuthorsRepository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn soft_deleted_authors_disappear_from_active_queries() {
        let repo = repository();
        repo.insert(&author("a1")).await.unwrap();
        repo.insert(&author("a2")).await.unwrap();

        let deleted = repo.soft_delete("a1").await.unwrap();
        assert_eq!(deleted.state, RecordState::Deleted);

        let listed: Vec<_> = repo.list_active().await.unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(listed, vec!["a2"]);
        assert!(repo.find_active("a1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_soft_delete_is_not_found() {
        let repo = repository();
        repo.insert(&author("a1")).await.unwrap();
        repo.soft_delete("a1").await.unwrap();

        let err = repo.soft_delete("a1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == AUTHOR_NOT_FOUND));
    }

    #[tokio::test]
    async fn replace_of_unknown_id_is_not_found() {
        let repo = repository();
        let err = repo.replace_by_id("ghost", &author("ghost")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find_many()
            .returning(|_, _| Err(AppError::Internal("connection reset".to_string())));

        let repo = AuthorsRepository::new(Arc::new(store));
        let err = repo.list_active().await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }

    #[tokio::test]
    async fn active_lookup_filters_on_state_and_id() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find_one()
            .withf(|collection, filter| {
                collection == AUTHORS
                    && *filter == Filter::new().eq("state", "ACTIVE").eq("_id", "a9")
            })
            .times(1)
            .returning(|_, _| Ok(None));

        let repo = AuthorsRepository::new(Arc::new(store));
        assert!(repo.find_active("a9").await.unwrap().is_none());
    }
}

//! Catalog service: authors, books and the embedded links between them
//!
//! Authors embed summaries of their books and books embed summaries of their
//! authors. Every write resolves submitted ids against active records and
//! replaces the embedded list wholesale; deletes fan out to strip the deleted
//! record from the other collection.
//!
//! None of this is transactional. Each fan-out step is its own read and
//! write, so a failure part-way leaves earlier documents updated, and two
//! concurrent writes touching the same document can lose one another's
//! changes (last writer wins).

use std::collections::HashSet;

use crate::{
    config::LinkPolicy,
    error::AppResult,
    models::{
        remove_summary, upsert_summary, Author, AuthorPayload, AuthorSummary, Book, BookPayload,
        BookSummary, RecordState,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    link_policy: LinkPolicy,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

impl CatalogService {
    pub fn new(repository: Repository, link_policy: LinkPolicy) -> Self {
        Self {
            repository,
            link_policy,
        }
    }

    // ------------------------------------------------------------------
    // Authors
    // ------------------------------------------------------------------

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list_active().await
    }

    pub async fn get_author(&self, id: &str) -> AppResult<Author> {
        self.repository.authors.get_active(id).await
    }

    /// Create an author, embedding the active books among the submitted ids
    pub async fn create_author(&self, payload: &AuthorPayload) -> AppResult<Author> {
        let fields = payload.fields()?;
        let books = match payload.book_ids() {
            Some(ids) => self.resolve_books(&ids).await?,
            None => Vec::new(),
        };

        let author = Author {
            id: new_id(),
            fullname: fields.fullname,
            birthdate: fields.birthdate,
            books,
            state: RecordState::Active,
        };
        self.repository.authors.insert(&author).await?;

        tracing::info!(
            "Catalog: created author id={} with {} book(s)",
            author.id,
            author.books.len()
        );

        if self.link_policy == LinkPolicy::Bidirectional {
            self.link_author(&author, &[]).await?;
        }

        Ok(author)
    }

    /// Update an active author; the embedded books are only replaced when ids are submitted
    pub async fn update_author(&self, id: &str, payload: &AuthorPayload) -> AppResult<Author> {
        let fields = payload.fields()?;
        let mut author = self.repository.authors.get_active(id).await?;
        let previous: Vec<String> = author.books.iter().map(|b| b.id.clone()).collect();

        author.fullname = fields.fullname;
        author.birthdate = fields.birthdate;
        if let Some(ids) = payload.book_ids() {
            author.books = self.resolve_books(&ids).await?;
        }

        self.repository.authors.replace_by_id(id, &author).await?;
        tracing::info!("Catalog: updated author id={}", author.id);

        if self.link_policy == LinkPolicy::Bidirectional {
            self.link_author(&author, &previous).await?;
        }

        Ok(author)
    }

    /// Soft-delete an author and strip it from every book that embeds it
    pub async fn delete_author(&self, id: &str) -> AppResult<()> {
        self.repository.authors.soft_delete(id).await?;

        let books = self.repository.books.list_referencing_author(id).await?;
        let mut cleaned = 0;
        for mut book in books {
            if remove_summary(&mut book.authors, id) {
                self.repository.books.replace_by_id(&book.id, &book).await?;
                cleaned += 1;
            }
        }

        tracing::info!(
            "Catalog: deleted author id={}, removed from {} book(s)",
            id,
            cleaned
        );
        Ok(())
    }

    /// Summaries of the active books among `ids`, in order; unknown ids are skipped
    async fn resolve_books(&self, ids: &[String]) -> AppResult<Vec<BookSummary>> {
        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            match self.repository.books.find_active(id).await? {
                Some(book) => summaries.push(BookSummary::from(&book)),
                None => tracing::debug!("Catalog: skipping unknown or inactive book id={}", id),
            }
        }
        Ok(summaries)
    }

    /// Refresh `author` in the books it embeds and drop it from books it no longer does
    async fn link_author(&self, author: &Author, previous: &[String]) -> AppResult<()> {
        let summary = AuthorSummary::from(author);
        let mut current = HashSet::new();

        for linked in &author.books {
            if !current.insert(linked.id.as_str()) {
                continue;
            }
            if let Some(mut book) = self.repository.books.find_active(&linked.id).await? {
                upsert_summary(&mut book.authors, summary.clone());
                self.repository.books.replace_by_id(&book.id, &book).await?;
            }
        }

        for id in previous.iter().filter(|id| !current.contains(id.as_str())) {
            if let Some(mut book) = self.repository.books.find_active(id).await? {
                if remove_summary(&mut book.authors, &author.id) {
                    self.repository.books.replace_by_id(&book.id, &book).await?;
                }
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Books
    // ------------------------------------------------------------------

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_active().await
    }

    pub async fn get_book(&self, id: &str) -> AppResult<Book> {
        self.repository.books.get_active(id).await
    }

    /// Create a book, embedding the active authors among the submitted ids
    pub async fn create_book(&self, payload: &BookPayload) -> AppResult<Book> {
        let fields = payload.fields()?;
        let authors = match payload.author_ids() {
            Some(ids) => self.resolve_authors(&ids).await?,
            None => Vec::new(),
        };

        let book = Book {
            id: new_id(),
            title: fields.title,
            publication_year: fields.publication_year,
            description: fields.description,
            authors,
            state: RecordState::Active,
        };
        self.repository.books.insert(&book).await?;

        tracing::info!(
            "Catalog: created book id={} with {} author(s)",
            book.id,
            book.authors.len()
        );

        if self.link_policy == LinkPolicy::Bidirectional {
            self.link_book(&book, &[]).await?;
        }

        Ok(book)
    }

    /// Update an active book; the embedded authors are only replaced when ids are submitted
    pub async fn update_book(&self, id: &str, payload: &BookPayload) -> AppResult<Book> {
        let fields = payload.fields()?;
        let mut book = self.repository.books.get_active(id).await?;
        let previous: Vec<String> = book.authors.iter().map(|a| a.id.clone()).collect();

        book.title = fields.title;
        book.publication_year = fields.publication_year;
        book.description = fields.description;
        if let Some(ids) = payload.author_ids() {
            book.authors = self.resolve_authors(&ids).await?;
        }

        self.repository.books.replace_by_id(id, &book).await?;
        tracing::info!("Catalog: updated book id={}", book.id);

        if self.link_policy == LinkPolicy::Bidirectional {
            self.link_book(&book, &previous).await?;
        }

        Ok(book)
    }

    /// Soft-delete a book and strip it from every author that embeds it
    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        self.repository.books.soft_delete(id).await?;

        let authors = self.repository.authors.list_referencing_book(id).await?;
        let mut cleaned = 0;
        for mut author in authors {
            if remove_summary(&mut author.books, id) {
                self.repository.authors.replace_by_id(&author.id, &author).await?;
                cleaned += 1;
            }
        }

        tracing::info!(
            "Catalog: deleted book id={}, removed from {} author(s)",
            id,
            cleaned
        );
        Ok(())
    }

    /// Summaries of the active authors among `ids`, in order; unknown ids are skipped
    async fn resolve_authors(&self, ids: &[String]) -> AppResult<Vec<AuthorSummary>> {
        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            match self.repository.authors.find_active(id).await? {
                Some(author) => summaries.push(AuthorSummary::from(&author)),
                None => tracing::debug!("Catalog: skipping unknown or inactive author id={}", id),
            }
        }
        Ok(summaries)
    }

    /// Refresh `book` in the authors it embeds and drop it from authors it no longer does
    async fn link_book(&self, book: &Book, previous: &[String]) -> AppResult<()> {
        let summary = BookSummary::from(book);
        let mut current = HashSet::new();

        for linked in &book.authors {
            if !current.insert(linked.id.as_str()) {
                continue;
            }
            if let Some(mut author) = self.repository.authors.find_active(&linked.id).await? {
                upsert_summary(&mut author.books, summary.clone());
                self.repository.authors.replace_by_id(&author.id, &author).await?;
            }
        }

        for id in previous.iter().filter(|id| !current.contains(id.as_str())) {
            if let Some(mut author) = self.repository.authors.find_active(id).await? {
                if remove_summary(&mut author.books, &book.id) {
                    self.repository.authors.replace_by_id(&author.id, &author).await?;
                }
            }
        }

        Ok(())
    }
}

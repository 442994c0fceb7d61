//! Document store abstraction
//!
//! Collections hold JSON documents keyed by their `_id`. Lookups are expressed
//! as containment filters: a document matches when every field of the filter
//! is present in it with an equal value, and an array in the filter matches
//! when each of its elements is contained in some element of the document's
//! array. That is the semantics of PostgreSQL's `jsonb @>` operator, which the
//! SQL backend delegates to, and the in-memory backend reproduces.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::error::AppResult;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

pub const AUTHORS: &str = "authors";
pub const BOOKS: &str = "books";
pub const USERS: &str = "users";

/// Containment filter over JSON documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    /// Require the array at `field` to hold an object whose `key` equals `value`
    pub fn has_element(mut self, field: &str, key: &str, value: impl Into<Value>) -> Self {
        let mut element = Map::new();
        element.insert(key.to_string(), value.into());
        self.0.insert(field.to_string(), json!([Value::Object(element)]));
        self
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn matches(&self, document: &Value) -> bool {
        contains(document, &self.as_value())
    }
}

fn contains(document: &Value, pattern: &Value) -> bool {
    match (document, pattern) {
        (Value::Object(doc), Value::Object(pat)) => pat
            .iter()
            .all(|(key, expected)| doc.get(key).is_some_and(|actual| contains(actual, expected))),
        (Value::Array(doc), Value::Array(pat)) => pat
            .iter()
            .all(|expected| doc.iter().any(|actual| contains(actual, expected))),
        (actual, expected) => actual == expected,
    }
}

/// Minimal document database client used by the repositories
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First matching document in insertion order
    async fn find_one(&self, collection: &str, filter: &Filter) -> AppResult<Option<Value>>;

    /// All matching documents in insertion order
    async fn find_many(&self, collection: &str, filter: &Filter) -> AppResult<Vec<Value>>;

    async fn insert(&self, collection: &str, id: &str, document: Value) -> AppResult<()>;

    /// Overwrite the document stored under `id`; `false` when there is none
    async fn replace(&self, collection: &str, id: &str, document: Value) -> AppResult<bool>;

    /// Connectivity check used by the readiness endpoint
    async fn ping(&self) -> AppResult<()>;
}

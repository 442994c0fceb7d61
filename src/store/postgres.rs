//! PostgreSQL-backed document store (one JSONB row per document)

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, Pool, Postgres};

use super::{DocumentStore, Filter};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Apply the embedded migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_one(&self, collection: &str, filter: &Filter) -> AppResult<Option<Value>> {
        let row = sqlx::query_scalar::<_, Json<Value>>(
            r#"
            SELECT body FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(collection)
        .bind(Json(filter.as_value()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|Json(body)| body))
    }

    async fn find_many(&self, collection: &str, filter: &Filter) -> AppResult<Vec<Value>> {
        let rows = sqlx::query_scalar::<_, Json<Value>>(
            r#"
            SELECT body FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY created_at, id
            "#,
        )
        .bind(collection)
        .bind(Json(filter.as_value()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|Json(body)| body).collect())
    }

    async fn insert(&self, collection: &str, id: &str, document: Value) -> AppResult<()> {
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Json(document))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace(&self, collection: &str, id: &str, document: Value) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE documents SET body = $3, modified_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(document))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

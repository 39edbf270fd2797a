use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::{DocumentStore, StoreError};

const CREATE_DOCUMENTS: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    key TEXT NOT NULL,
    body JSONB NOT NULL,
    PRIMARY KEY (collection, key)
)";

/// Document store backed by a single Postgres `documents` table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Creates the `documents` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_DOCUMENTS).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND key = $2")
            .bind(collection)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(body): Json<Value> = row.try_get("body")?;
                Ok(Some(body))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, collection: &str, key: &str, document: Value) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO documents (collection, key, body) VALUES ($1, $2, $3)
             ON CONFLICT (collection, key) DO UPDATE SET body = EXCLUDED.body",
        )
        .bind(collection)
        .bind(key)
        .bind(Json(document))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn put_if_absent(
        &self,
        collection: &str,
        key: &str,
        document: Value,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO documents (collection, key, body) VALUES ($1, $2, $3)
             ON CONFLICT (collection, key) DO NOTHING",
        )
        .bind(collection)
        .bind(key)
        .bind(Json(document))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn scan_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 AND body ->> $2 = $3 ORDER BY key",
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let Json(body): Json<Value> = row.try_get("body")?;
                Ok(body)
            })
            .collect()
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND key = $2")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Requires a reachable Postgres in DATABASE_URL.
    #[ignore]
    #[actix_rt::test]
    async fn test_documents_round_trip_through_postgres() {
        dotenv::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let store = PgDocumentStore::connect(&url).await.unwrap();
        store.ensure_schema().await.unwrap();

        let key = uuid::Uuid::new_v4().to_string();
        assert!(store.put_if_absent("tasks", &key, json!({"userId": key})).await.unwrap());
        assert!(!store.put_if_absent("tasks", &key, json!({})).await.unwrap());
        assert_eq!(store.scan_eq("tasks", "userId", &key).await.unwrap().len(), 1);
        assert!(store.delete("tasks", &key).await.unwrap());
        assert_eq!(store.get("tasks", &key).await.unwrap(), None);
    }
}

//! Key-value document storage for users and tasks.
//!
//! The handlers never talk to a backend directly. They go through
//! [`UserRepository`] and [`TaskRepository`], which encode typed records as JSON
//! documents in a [`DocumentStore`]. Two backends exist: [`MemoryStore`] for tests and
//! single-process deployments, and [`PgDocumentStore`] for Postgres.

pub mod memory;
pub mod postgres;
pub mod repository;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use repository::{TaskRepository, UserRepository};

/// Collection holding [`User`](crate::models::User) documents keyed by username.
pub const USERS: &str = "users";
/// Collection holding [`Task`](crate::models::Task) documents keyed by task id.
pub const TASKS: &str = "tasks";

#[derive(Debug)]
pub enum StoreError {
    /// The backend could not be reached or rejected the operation.
    Backend(String),
    /// A stored document did not match the expected record shape.
    Codec(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "store backend error: {}", msg),
            StoreError::Codec(e) => write!(f, "document codec error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::Backend(error.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Codec(error)
    }
}

/// A collection-scoped key-value store of JSON documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Inserts or replaces the document under `key`.
    async fn put(&self, collection: &str, key: &str, document: Value) -> Result<(), StoreError>;

    /// Inserts the document only if `key` is free. Returns `false` when it was taken.
    async fn put_if_absent(
        &self,
        collection: &str,
        key: &str,
        document: Value,
    ) -> Result<bool, StoreError>;

    /// Returns every document whose top-level string `field` equals `value`.
    async fn scan_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>, StoreError>;

    /// Deletes the document under `key`. Returns `false` when nothing was there.
    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError>;
}

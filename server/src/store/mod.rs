//! Storage backends for todos.
//!
//! Services only see [`TodoStore`], so the backing store is chosen at
//! startup and tests can run the same scenarios against every backend.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use todo_core::Todo;

use crate::config::{StorageBackend, StorageConfig};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos in storage order.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    async fn insert(&self, todo: Todo) -> Result<Todo, StoreError>;

    /// Flip `completed`; `None` when no todo has this id.
    async fn toggle(&self, id: &str) -> Result<Option<Todo>, StoreError>;

    /// Delete and return the todo; `None` when no todo has this id.
    async fn remove(&self, id: &str) -> Result<Option<Todo>, StoreError>;
}

/// Open the backend named by `config`.
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn TodoStore>, StoreError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::Sqlite => {
            let store = SqliteStore::connect(&config.database_url, config.max_connections).await?;
            Ok(Arc::new(store))
        }
    }
}

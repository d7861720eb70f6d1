use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use todo_core::Todo;
use tracing::info;

use super::{StoreError, TodoStore};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id          TEXT PRIMARY KEY NOT NULL,
    text        TEXT NOT NULL,
    completed   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
)
"#;

#[derive(Debug, FromRow)]
struct TodoRow {
    id: String,
    text: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            text: row.text,
            completed: row.completed,
            created_at: row.created_at,
        }
    }
}

/// Todos persisted in a SQLite database through an sqlx pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and make sure the
    /// `todos` table exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own empty
        // database, so those pools hold exactly one connection forever.
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        info!(url, in_memory, "sqlite todo store ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            "SELECT id, text, completed, created_at FROM todos ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn insert(&self, todo: Todo) -> Result<Todo, StoreError> {
        sqlx::query("INSERT INTO todos (id, text, completed, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&todo.id)
            .bind(&todo.text)
            .bind(todo.completed)
            .bind(todo.created_at)
            .execute(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn toggle(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            UPDATE todos SET completed = NOT completed
            WHERE id = $1
            RETURNING id, text, completed, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }

    async fn remove(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        let row = sqlx::query_as::<_, TodoRow>(
            "DELETE FROM todos WHERE id = $1 RETURNING id, text, completed, created_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", 1).await.unwrap()
    }

    fn todo(id: &str, text: &str) -> Todo {
        Todo {
            id: id.to_string(),
            text: text.to_string(),
            completed: false,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_then_list_round_trips_fields() {
        let store = store().await;
        let inserted = store.insert(todo("a", "Buy milk")).await.unwrap();
        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![inserted]);
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let store = store().await;
        store.insert(todo("z", "first")).await.unwrap();
        store.insert(todo("a", "second")).await.unwrap();
        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[tokio::test]
    async fn toggle_flips_and_persists() {
        let store = store().await;
        store.insert(todo("a", "x")).await.unwrap();
        assert!(store.toggle("a").await.unwrap().unwrap().completed);
        assert!(store.list().await.unwrap()[0].completed);
        assert!(!store.toggle("a").await.unwrap().unwrap().completed);
        assert!(store.toggle("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_deletes_exactly_one() {
        let store = store().await;
        store.insert(todo("a", "x")).await.unwrap();
        store.insert(todo("b", "y")).await.unwrap();
        let removed = store.remove("a").await.unwrap().unwrap();
        assert_eq!(removed.text, "x");
        assert!(store.remove("a").await.unwrap().is_none());
        let remaining = store.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "b");
    }

    #[tokio::test]
    async fn duplicate_id_is_a_database_error() {
        let store = store().await;
        store.insert(todo("a", "x")).await.unwrap();
        let err = store.insert(todo("a", "y")).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }
}

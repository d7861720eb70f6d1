//! Todo orchestration: validation, identity and timestamps on top of a
//! [`TodoStore`].

use std::sync::Arc;

use chrono::Utc;
use todo_core::{AddTodoInput, Todo, Validate};
use tracing::debug;
use uuid::Uuid;

use super::ServiceError;
use crate::store::TodoStore;

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Todo>, ServiceError> {
        Ok(self.store.list().await?)
    }

    /// Create an open todo with a fresh id. Empty text is rejected before
    /// anything is stored.
    pub async fn add(&self, input: AddTodoInput) -> Result<Todo, ServiceError> {
        input.validate()?;
        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            text: input.text,
            completed: false,
            created_at: Utc::now(),
        };
        debug!(id = %todo.id, "adding todo");
        Ok(self.store.insert(todo).await?)
    }

    /// Unknown ids are not an error; they yield `None` and change nothing.
    pub async fn toggle(&self, id: &str) -> Result<Option<Todo>, ServiceError> {
        let todo = self.store.toggle(id).await?;
        if todo.is_none() {
            debug!(id, "toggle on unknown todo");
        }
        Ok(todo)
    }

    /// Unknown ids yield `None`, like [`TodoService::toggle`].
    pub async fn delete(&self, id: &str) -> Result<Option<Todo>, ServiceError> {
        let todo = self.store.remove(id).await?;
        if todo.is_none() {
            debug!(id, "delete on unknown todo");
        }
        Ok(todo)
    }
}

use async_trait::async_trait;
use tokio::sync::RwLock;
use todo_core::Todo;

use super::{StoreError, TodoStore};

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: RwLock<Vec<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.todos.read().await.clone())
    }

    async fn insert(&self, todo: Todo) -> Result<Todo, StoreError> {
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn toggle(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        Ok(todos.iter_mut().find(|todo| todo.id == id).map(|todo| {
            todo.completed = !todo.completed;
            todo.clone()
        }))
    }

    async fn remove(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        let position = todos.iter().position(|todo| todo.id == id);
        Ok(position.map(|index| todos.remove(index)))
    }
}

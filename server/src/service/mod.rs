mod health;
mod todos;

use thiserror::Error;
use todo_core::ValidationError;

use crate::store::StoreError;

pub use health::HealthService;
pub use todos::TodoService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

use thiserror::Error;
use todo_core::{ErrorCode, ErrorShape, ProcedureKind, ValidationError};

use crate::service::ServiceError;

/// Why one procedure call failed. Converted into an error envelope, never
/// leaked to the caller as-is.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    #[error("{0}")]
    Parse(String),

    /// The URL itself could not be read.
    #[error("{0}")]
    MalformedRequest(String),

    /// The input did not deserialize into the procedure's input type.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Validation(ValidationError),

    #[error("No \"{kind}\"-procedure on path \"{path}\"")]
    NotFound { kind: ProcedureKind, path: String },

    #[error("Unsupported {method}-request to {kind} procedure at path \"{path}\"")]
    MethodNotSupported {
        method: &'static str,
        kind: ProcedureKind,
        path: String,
    },

    /// The detail is for the log; callers only see a fixed message.
    #[error("Internal server error")]
    Internal(String),
}

impl RpcError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RpcError::Parse(_) => ErrorCode::ParseError,
            RpcError::MalformedRequest(_) | RpcError::InvalidInput(_) | RpcError::Validation(_) => {
                ErrorCode::BadRequest
            }
            RpcError::NotFound { .. } => ErrorCode::NotFound,
            RpcError::MethodNotSupported { .. } => ErrorCode::MethodNotSupported,
            RpcError::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    pub fn to_shape(&self, path: &str) -> ErrorShape {
        let shape = ErrorShape::new(self.code(), self.to_string(), Some(path));
        match self {
            RpcError::Validation(err) => shape.with_issues(err.issues.clone()),
            _ => shape,
        }
    }
}

impl From<ServiceError> for RpcError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(err) => RpcError::Validation(err),
            ServiceError::Store(err) => RpcError::Internal(err.to_string()),
        }
    }
}

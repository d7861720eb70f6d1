//! Error types for the todo API client.
//!
//! # Design
//! `Procedure` is the structured error the server reported for one call, so
//! callers can branch on its `ErrorCode`. Responses that are not envelopes at
//! all land in `HttpError` with the raw status and body for debugging.

use thiserror::Error;

use crate::envelope::{ErrorCode, ErrorShape};

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered the call with an error envelope.
    #[error("{code} ({http_status}): {message}")]
    Procedure {
        code: ErrorCode,
        message: String,
        http_status: u16,
    },

    /// The server answered with something other than an envelope.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("a batch needs at least one call")]
    EmptyBatch,

    /// Queries and mutations use different HTTP methods and cannot share a
    /// request.
    #[error("a batch cannot mix queries and mutations")]
    MixedBatch,

    #[error("batch response has {actual} entries, expected {expected}")]
    BatchLength { expected: usize, actual: usize },
}

impl ApiError {
    /// The server-side error code, when the server produced one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ApiError::Procedure { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<ErrorShape> for ApiError {
    fn from(shape: ErrorShape) -> Self {
        ApiError::Procedure {
            code: shape.data.code,
            message: shape.message,
            http_status: shape.data.http_status,
        }
    }
}

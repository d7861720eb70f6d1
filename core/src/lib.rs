//! Shared contract and synchronous API client core for the todo service.
//!
//! # Overview
//! `contract` defines the procedures, their input/output types and input
//! validation; the server decodes with the same types the client encodes
//! with. `envelope` describes the JSON result/error envelopes on the wire.
//!
//! `TodoClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). The caller executes
//! the actual HTTP round-trip, making the core fully deterministic and
//! testable.

pub mod client;
pub mod contract;
pub mod envelope;
pub mod error;
pub mod http;

pub use client::{decode_output, Batch, TodoClient};
pub use contract::{
    procedures, AddTodoInput, Contract, HealthReport, NoInput, Procedure, ProcedureKind, Todo,
    TodoIdInput, Validate, ValidationError, ValidationIssue,
};
pub use envelope::{batch_status, Envelope, ErrorCode, ErrorData, ErrorShape};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};

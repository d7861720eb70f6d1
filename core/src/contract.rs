//! Typed procedure contract shared by the server and the client.
//!
//! # Design
//! Each remote procedure is a marker type implementing [`Contract`], which
//! pins its dotted path, its kind, and the input/output types that travel on
//! the wire. The server decodes inputs through the same types the client
//! encodes them with, so there is no separate schema description to keep in
//! sync.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// A single todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload of `health.status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
}

impl HealthReport {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
        }
    }
}

/// Input of `todos.add`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddTodoInput {
    pub text: String,
}

impl AddTodoInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Input of `todos.toggle` and `todos.delete`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoIdInput {
    pub id: String,
}

impl TodoIdInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Input of procedures that take none. Serializes as `null` and accepts any
/// payload on the way in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoInput;

impl Serialize for NoInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

impl<'de> Deserialize<'de> for NoInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(NoInput)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// One failed rule, addressed by the dotted path of the offending field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

/// Input rejected by [`Validate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn single(path: &str, message: &str) -> Self {
        Self {
            issues: vec![ValidationIssue {
                path: path.to_string(),
                message: message.to_string(),
            }],
        }
    }
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.path, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Rules checked after an input has been deserialized and before it reaches
/// a service.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Validate for NoInput {}

impl Validate for TodoIdInput {}

impl Validate for AddTodoInput {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.text.is_empty() {
            return Err(ValidationError::single(
                "text",
                "String must contain at least 1 character(s)",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Procedures
// ---------------------------------------------------------------------------

/// Whether a procedure reads (query, sent as GET) or writes (mutation, sent
/// as POST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

impl ProcedureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcedureKind::Query => "query",
            ProcedureKind::Mutation => "mutation",
        }
    }
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every procedure the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    HealthStatus,
    TodosGetAll,
    TodosAdd,
    TodosToggle,
    TodosDelete,
}

impl Procedure {
    pub const ALL: [Procedure; 5] = [
        Procedure::HealthStatus,
        Procedure::TodosGetAll,
        Procedure::TodosAdd,
        Procedure::TodosToggle,
        Procedure::TodosDelete,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Procedure::HealthStatus => "health.status",
            Procedure::TodosGetAll => "todos.getAll",
            Procedure::TodosAdd => "todos.add",
            Procedure::TodosToggle => "todos.toggle",
            Procedure::TodosDelete => "todos.delete",
        }
    }

    pub fn kind(self) -> ProcedureKind {
        match self {
            Procedure::HealthStatus | Procedure::TodosGetAll => ProcedureKind::Query,
            Procedure::TodosAdd | Procedure::TodosToggle | Procedure::TodosDelete => {
                ProcedureKind::Mutation
            }
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.path() == path)
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Binds a marker type to a procedure and its wire types.
pub trait Contract {
    const PROCEDURE: Procedure;
    type Input: Serialize + for<'de> Deserialize<'de> + Validate + Send;
    type Output: Serialize + for<'de> Deserialize<'de> + Send;
}

pub mod procedures {
    use super::*;

    /// `health.status` (query)
    pub struct HealthStatus;

    impl Contract for HealthStatus {
        const PROCEDURE: Procedure = Procedure::HealthStatus;
        type Input = NoInput;
        type Output = HealthReport;
    }

    /// `todos.getAll` (query)
    pub struct TodosGetAll;

    impl Contract for TodosGetAll {
        const PROCEDURE: Procedure = Procedure::TodosGetAll;
        type Input = NoInput;
        type Output = Vec<Todo>;
    }

    /// `todos.add` (mutation)
    pub struct TodosAdd;

    impl Contract for TodosAdd {
        const PROCEDURE: Procedure = Procedure::TodosAdd;
        type Input = AddTodoInput;
        type Output = Todo;
    }

    /// `todos.toggle` (mutation); `None` when the id is unknown.
    pub struct TodosToggle;

    impl Contract for TodosToggle {
        const PROCEDURE: Procedure = Procedure::TodosToggle;
        type Input = TodoIdInput;
        type Output = Option<Todo>;
    }

    /// `todos.delete` (mutation); `None` when the id is unknown.
    pub struct TodosDelete;

    impl Contract for TodosDelete {
        const PROCEDURE: Procedure = Procedure::TodosDelete;
        type Input = TodoIdInput;
        type Output = Option<Todo>;
    }
}

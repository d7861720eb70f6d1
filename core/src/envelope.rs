//! JSON envelopes carried by every procedure response.
//!
//! A successful call answers `{"result":{"data":...}}`; a failed one answers
//! `{"error":{"message","code","data":{...}}}` where `code` is the JSON-RPC
//! number and `data.code` the symbolic name. Batched calls answer an array of
//! envelopes in call order.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::contract::ValidationIssue;

/// Symbolic error codes, each with a fixed JSON-RPC number and HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ParseError,
    BadRequest,
    NotFound,
    MethodNotSupported,
    InternalServerError,
}

impl ErrorCode {
    const ALL: [ErrorCode; 5] = [
        ErrorCode::ParseError,
        ErrorCode::BadRequest,
        ErrorCode::NotFound,
        ErrorCode::MethodNotSupported,
        ErrorCode::InternalServerError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn json_rpc_code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::BadRequest => -32600,
            ErrorCode::NotFound => -32004,
            ErrorCode::MethodNotSupported => -32005,
            ErrorCode::InternalServerError => -32603,
        }
    }

    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::ParseError | ErrorCode::BadRequest => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::MethodNotSupported => 405,
            ErrorCode::InternalServerError => 500,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        ErrorCode::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown error code {name}")))
    }
}

/// Structured details attached to an error envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    pub code: ErrorCode,
    pub http_status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
}

/// Body of the `error` member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorShape {
    pub message: String,
    pub code: i32,
    pub data: ErrorData,
}

impl ErrorShape {
    pub fn new(code: ErrorCode, message: impl Into<String>, path: Option<&str>) -> Self {
        Self {
            message: message.into(),
            code: code.json_rpc_code(),
            data: ErrorData {
                code,
                http_status: code.http_status(),
                path: path.map(str::to_string),
                issues: Vec::new(),
            },
        }
    }

    pub fn with_issues(mut self, issues: Vec<ValidationIssue>) -> Self {
        self.data.issues = issues;
        self
    }
}

/// Body of the `result` member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultData {
    pub data: Value,
}

/// One response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Envelope {
    Success { result: ResultData },
    Failure { error: ErrorShape },
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Envelope::Success {
            result: ResultData { data },
        }
    }

    pub fn failure(error: ErrorShape) -> Self {
        Envelope::Failure { error }
    }

    /// HTTP status this envelope would have on its own.
    pub fn http_status(&self) -> u16 {
        match self {
            Envelope::Success { .. } => 200,
            Envelope::Failure { error } => error.data.http_status,
        }
    }

    pub fn into_result(self) -> Result<Value, ErrorShape> {
        match self {
            Envelope::Success { result } => Ok(result.data),
            Envelope::Failure { error } => Err(error),
        }
    }
}

/// Status for a batch response: the common status of all envelopes, or 207
/// when they disagree.
pub fn batch_status(envelopes: &[Envelope]) -> u16 {
    let mut statuses = envelopes.iter().map(Envelope::http_status);
    match statuses.next() {
        Some(first) if statuses.all(|s| s == first) => first,
        Some(_) => 207,
        None => 200,
    }
}

//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only the endpoint `base_url` and carries no mutable
//! state between calls. Every procedure call is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. The caller executes the HTTP round-trip in between,
//! keeping the core deterministic and free of I/O dependencies.
//!
//! Several calls of the same kind can share one round-trip through
//! [`Batch`]: the paths are joined with commas and the inputs are sent as an
//! object keyed by call index.

use serde_json::{Map, Value};

use crate::contract::procedures::{HealthStatus, TodosAdd, TodosDelete, TodosGetAll, TodosToggle};
use crate::contract::{
    AddTodoInput, Contract, HealthReport, Procedure, ProcedureKind, Todo, TodoIdInput,
};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Synchronous, stateless client for the todo API.
///
/// `base_url` is the procedure endpoint, e.g. `http://localhost:3000/trpc`.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // Generic calls
    // -----------------------------------------------------------------------

    pub fn build_call<P: Contract>(&self, input: &P::Input) -> Result<HttpRequest, ApiError> {
        let input = encode_input(input)?;
        let procedure = P::PROCEDURE;
        let url = format!("{}/{}", self.base_url, procedure.path());
        Ok(self.request(procedure.kind(), url, Vec::new(), input))
    }

    pub fn parse_call<P: Contract>(&self, response: HttpResponse) -> Result<P::Output, ApiError> {
        let envelope: Envelope = parse_body(&response)?;
        let data = envelope.into_result()?;
        decode_output::<P>(data)
    }

    // -----------------------------------------------------------------------
    // Named procedures
    // -----------------------------------------------------------------------

    pub fn build_health_status(&self) -> HttpRequest {
        self.bare_request(Procedure::HealthStatus)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.bare_request(Procedure::TodosGetAll)
    }

    pub fn build_add_todo(&self, text: &str) -> Result<HttpRequest, ApiError> {
        self.build_call::<TodosAdd>(&AddTodoInput::new(text))
    }

    pub fn build_toggle_todo(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.build_call::<TodosToggle>(&TodoIdInput::new(id))
    }

    pub fn build_delete_todo(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.build_call::<TodosDelete>(&TodoIdInput::new(id))
    }

    pub fn parse_health_status(&self, response: HttpResponse) -> Result<HealthReport, ApiError> {
        self.parse_call::<HealthStatus>(response)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        self.parse_call::<TodosGetAll>(response)
    }

    pub fn parse_add_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        self.parse_call::<TodosAdd>(response)
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<Option<Todo>, ApiError> {
        self.parse_call::<TodosToggle>(response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<Option<Todo>, ApiError> {
        self.parse_call::<TodosDelete>(response)
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    /// Build one request carrying every call in `batch`.
    pub fn build_batch(&self, batch: &Batch) -> Result<HttpRequest, ApiError> {
        let kind = batch.kind()?;
        let paths: Vec<&str> = batch.calls.iter().map(|call| call.procedure.path()).collect();

        let mut inputs = Map::new();
        for (index, call) in batch.calls.iter().enumerate() {
            if !call.input.is_null() {
                inputs.insert(index.to_string(), call.input.clone());
            }
        }
        let inputs = serde_json::to_string(&Value::Object(inputs))
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;

        let url = format!("{}/{}", self.base_url, paths.join(","));
        Ok(self.request(kind, url, vec![("batch", "1".to_string())], Some(inputs)))
    }

    /// Split a batch response into one outcome per call, in call order.
    ///
    /// The outer `Result` fails only when the response as a whole is
    /// unusable; per-call errors come back in the inner results.
    pub fn parse_batch(
        &self,
        batch: &Batch,
        response: HttpResponse,
    ) -> Result<Vec<Result<Value, ApiError>>, ApiError> {
        let envelopes: Vec<Envelope> = parse_body(&response)?;
        if envelopes.len() != batch.len() {
            return Err(ApiError::BatchLength {
                expected: batch.len(),
                actual: envelopes.len(),
            });
        }
        Ok(envelopes
            .into_iter()
            .map(|envelope| envelope.into_result().map_err(ApiError::from))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Request assembly
    // -----------------------------------------------------------------------

    fn bare_request(&self, procedure: Procedure) -> HttpRequest {
        let url = format!("{}/{}", self.base_url, procedure.path());
        self.request(procedure.kind(), url, Vec::new(), None)
    }

    /// Queries carry their input in the query string, mutations in the body.
    fn request(
        &self,
        kind: ProcedureKind,
        url: String,
        mut params: Vec<(&str, String)>,
        input: Option<String>,
    ) -> HttpRequest {
        match kind {
            ProcedureKind::Query => {
                if let Some(input) = input {
                    params.push(("input", input));
                }
                HttpRequest {
                    method: HttpMethod::Get,
                    url: with_query(url, &params),
                    headers: Vec::new(),
                    body: None,
                }
            }
            ProcedureKind::Mutation => {
                let headers = if input.is_some() {
                    vec![("content-type".to_string(), "application/json".to_string())]
                } else {
                    Vec::new()
                };
                HttpRequest {
                    method: HttpMethod::Post,
                    url: with_query(url, &params),
                    headers,
                    body: input,
                }
            }
        }
    }
}

/// An ordered list of calls sent in one round-trip.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    calls: Vec<BatchCall>,
}

#[derive(Debug, Clone)]
struct BatchCall {
    procedure: Procedure,
    input: Value,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call; its index in the batch is the current length.
    pub fn push<P: Contract>(&mut self, input: &P::Input) -> Result<&mut Self, ApiError> {
        let input =
            serde_json::to_value(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        self.calls.push(BatchCall {
            procedure: P::PROCEDURE,
            input,
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    fn kind(&self) -> Result<ProcedureKind, ApiError> {
        let mut kinds = self.calls.iter().map(|call| call.procedure.kind());
        let first = kinds.next().ok_or(ApiError::EmptyBatch)?;
        if kinds.any(|kind| kind != first) {
            return Err(ApiError::MixedBatch);
        }
        Ok(first)
    }
}

/// Decode one call's `data` into the procedure's output type.
pub fn decode_output<P: Contract>(data: Value) -> Result<P::Output, ApiError> {
    serde_json::from_value(data).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Serialize an input, mapping `null` (no input) to `None`.
fn encode_input<T: serde::Serialize>(input: &T) -> Result<Option<String>, ApiError> {
    let value =
        serde_json::to_value(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    if value.is_null() {
        return Ok(None);
    }
    serde_json::to_string(&value)
        .map(Some)
        .map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn with_query(url: String, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return url;
    }
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect();
    format!("{url}?{}", query.join("&"))
}

/// Deserialize an envelope body. A body that is not an envelope is reported
/// as `HttpError` on non-2xx statuses and as `DeserializationError` otherwise.
fn parse_body<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| {
        if (200..300).contains(&response.status) {
            ApiError::DeserializationError(e.to_string())
        } else {
            ApiError::HttpError {
                status: response.status,
                body: response.body.clone(),
            }
        }
    })
}

//! Procedure-call endpoint.
//!
//! # Design
//! All procedures live under one route, `/trpc/{paths}`. GET carries queries
//! with their input in the `input` query parameter; POST carries mutations
//! with their input as the body. `?batch=1` joins several calls of the same
//! kind into one request; they run sequentially in index order and answer a
//! JSON array of envelopes.

mod dispatch;
mod error;
mod request;

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use todo_core::{batch_status, Envelope, ErrorShape, ProcedureKind};
use tracing::warn;

use crate::AppState;
use error::RpcError;
use request::RpcQuery;

pub fn router() -> Router<AppState> {
    Router::new().route("/trpc/{paths}", get(handle_query).post(handle_mutation))
}

async fn handle_query(
    State(state): State<AppState>,
    paths: Result<Path<String>, PathRejection>,
    query: Result<Query<RpcQuery>, QueryRejection>,
) -> Response {
    let (paths, query) = match extract(paths, query) {
        Ok(extracted) => extracted,
        Err(err) => return rejected(err),
    };
    let raw_input = query.input.as_deref().map(str::as_bytes);
    respond(&state, ProcedureKind::Query, &paths, query.is_batch(), raw_input).await
}

async fn handle_mutation(
    State(state): State<AppState>,
    paths: Result<Path<String>, PathRejection>,
    query: Result<Query<RpcQuery>, QueryRejection>,
    body: Bytes,
) -> Response {
    let (paths, query) = match extract(paths, query) {
        Ok(extracted) => extracted,
        Err(err) => return rejected(err),
    };
    respond(
        &state,
        ProcedureKind::Mutation,
        &paths,
        query.is_batch(),
        Some(body.as_ref()),
    )
    .await
}

fn extract(
    paths: Result<Path<String>, PathRejection>,
    query: Result<Query<RpcQuery>, QueryRejection>,
) -> Result<(String, RpcQuery), RpcError> {
    let Path(paths) = paths.map_err(|e| RpcError::MalformedRequest(e.body_text()))?;
    let Query(query) = query.map_err(|e| RpcError::Parse(e.body_text()))?;
    Ok((paths, query))
}

/// The request never named a usable call, so the envelope carries no path.
fn rejected(err: RpcError) -> Response {
    warn!(error = %err, "request rejected before dispatch");
    let envelope = Envelope::failure(ErrorShape::new(err.code(), err.to_string(), None));
    let status =
        StatusCode::from_u16(envelope.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(envelope)).into_response()
}

async fn respond(
    state: &AppState,
    method_kind: ProcedureKind,
    paths: &str,
    batch: bool,
    raw_input: Option<&[u8]>,
) -> Response {
    let calls = request::parse_calls(paths, batch, raw_input);

    let mut envelopes = Vec::with_capacity(calls.len());
    for call in calls {
        envelopes.push(dispatch::dispatch(state, method_kind, call).await);
    }

    let status = StatusCode::from_u16(batch_status(&envelopes))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if batch {
        (status, Json(envelopes)).into_response()
    } else {
        match envelopes.pop() {
            Some(envelope) => (status, Json(envelope)).into_response(),
            None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

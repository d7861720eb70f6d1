use serde_json::Value;
use todo_core::procedures::{HealthStatus, TodosAdd, TodosDelete, TodosGetAll, TodosToggle};
use todo_core::{Contract, Envelope, ErrorCode, Procedure, ProcedureKind, Validate};
use tracing::{error, info, warn};

use super::error::RpcError;
use super::request::Call;
use crate::AppState;

/// Run one call and wrap its outcome in an envelope. `method_kind` is the
/// kind the HTTP method allows (GET queries, POST mutations).
pub async fn dispatch(state: &AppState, method_kind: ProcedureKind, call: Call) -> Envelope {
    let path = call.path.clone();
    match invoke(state, method_kind, call).await {
        Ok(data) => Envelope::success(data),
        Err(err) => {
            match err.code() {
                ErrorCode::InternalServerError => {
                    error!(path = %path, detail = ?err, "procedure failed");
                }
                code => warn!(path = %path, %code, message = %err, "procedure rejected"),
            }
            Envelope::failure(err.to_shape(&path))
        }
    }
}

async fn invoke(
    state: &AppState,
    method_kind: ProcedureKind,
    call: Call,
) -> Result<Value, RpcError> {
    let input = call.input?;
    let procedure = Procedure::from_path(&call.path).ok_or_else(|| RpcError::NotFound {
        kind: method_kind,
        path: call.path.clone(),
    })?;
    if procedure.kind() != method_kind {
        return Err(RpcError::MethodNotSupported {
            method: match method_kind {
                ProcedureKind::Query => "GET",
                ProcedureKind::Mutation => "POST",
            },
            kind: procedure.kind(),
            path: call.path,
        });
    }

    info!(path = %procedure, kind = %procedure.kind(), "dispatching call");
    match procedure {
        Procedure::HealthStatus => {
            decode::<HealthStatus>(input)?;
            encode::<HealthStatus>(state.health.status())
        }
        Procedure::TodosGetAll => {
            decode::<TodosGetAll>(input)?;
            encode::<TodosGetAll>(state.todos.list().await?)
        }
        Procedure::TodosAdd => {
            let input = decode::<TodosAdd>(input)?;
            encode::<TodosAdd>(state.todos.add(input).await?)
        }
        Procedure::TodosToggle => {
            let input = decode::<TodosToggle>(input)?;
            encode::<TodosToggle>(state.todos.toggle(&input.id).await?)
        }
        Procedure::TodosDelete => {
            let input = decode::<TodosDelete>(input)?;
            encode::<TodosDelete>(state.todos.delete(&input.id).await?)
        }
    }
}

/// Deserialize and validate before any service runs. Absent input decodes
/// from `null`.
fn decode<P: Contract>(input: Option<Value>) -> Result<P::Input, RpcError> {
    let input: P::Input = serde_json::from_value(input.unwrap_or(Value::Null))
        .map_err(|e| RpcError::InvalidInput(format!("Invalid input: {e}")))?;
    input.validate().map_err(RpcError::Validation)?;
    Ok(input)
}

fn encode<P: Contract>(output: P::Output) -> Result<Value, RpcError> {
    serde_json::to_value(output).map_err(|e| RpcError::Internal(e.to_string()))
}

//! Splitting one HTTP request into procedure calls.
//!
//! Single calls name one path and carry the raw input JSON. Batched calls
//! (`?batch=1`) name comma-separated paths and carry an object whose keys are
//! call indexes; a missing key means that call has no input.

use serde::Deserialize;
use serde_json::Value;

use super::error::RpcError;

#[derive(Debug, Deserialize)]
pub struct RpcQuery {
    pub batch: Option<String>,
    pub input: Option<String>,
}

impl RpcQuery {
    pub fn is_batch(&self) -> bool {
        matches!(self.batch.as_deref(), Some("1") | Some("true"))
    }
}

/// One call as received, before its procedure is resolved.
#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub input: Result<Option<Value>, RpcError>,
}

pub fn parse_calls(paths: &str, batch: bool, raw_input: Option<&[u8]>) -> Vec<Call> {
    if !batch {
        return vec![Call {
            path: paths.to_string(),
            input: parse_json(raw_input),
        }];
    }

    let paths: Vec<&str> = paths.split(',').collect();
    let mut inputs = match parse_json(raw_input).and_then(batch_inputs) {
        Ok(inputs) => inputs,
        Err(err) => {
            return paths
                .into_iter()
                .map(|path| Call {
                    path: path.to_string(),
                    input: Err(err.clone()),
                })
                .collect();
        }
    };

    paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| Call {
            path: path.to_string(),
            input: Ok(inputs.remove(&index.to_string())),
        })
        .collect()
}

/// Blank input means no input.
fn parse_json(raw: Option<&[u8]>) -> Result<Option<Value>, RpcError> {
    match raw {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| RpcError::Parse(format!("Failed to parse input JSON: {e}"))),
        _ => Ok(None),
    }
}

fn batch_inputs(value: Option<Value>) -> Result<serde_json::Map<String, Value>, RpcError> {
    match value {
        None | Some(Value::Null) => Ok(serde_json::Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(RpcError::Parse(
            "Batch input must be an object keyed by call index".to_string(),
        )),
    }
}

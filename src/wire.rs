use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{ClientError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest<'a, I: ?Sized> {
    pub id: Uuid,
    pub created: u64,
    pub api_key: &'a str,
    pub model_key: &'a str,
    pub model_inputs: &'a I,
    pub start_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest<'a> {
    pub id: Uuid,
    pub created: u64,
    pub long_poll: bool,
    pub api_key: &'a str,
    #[serde(rename = "callID")]
    pub call_id: &'a str,
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

pub(crate) fn message(envelope: &Value) -> Option<&str> {
    envelope.get("message").and_then(Value::as_str)
}

pub(crate) fn is_finished(envelope: &Value) -> bool {
    envelope.get("finished").and_then(Value::as_bool) == Some(true)
}

pub(crate) fn is_success(envelope: &Value) -> bool {
    message(envelope).is_some_and(|message| message.eq_ignore_ascii_case("success"))
}

pub(crate) fn call_id(envelope: &Value) -> Option<&str> {
    envelope.get("callID").and_then(Value::as_str)
}

/// Rejects envelopes whose `message` reports an error despite a 200.
pub(crate) fn ensure_job_ok(envelope: Value) -> Result<Value> {
    match message(&envelope) {
        Some(message) if message.to_ascii_lowercase().contains("error") => {
            Err(ClientError::RemoteJobError {
                message: message.to_owned(),
                body: envelope,
            })
        }
        _ => Ok(envelope),
    }
}

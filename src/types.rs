use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Identity of one submitted job.
///
/// `request_id` is sent with every start and check request for the job;
/// `call_id` is what the service assigned to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobHandle {
    pub call_id: String,
    pub request_id: Uuid,
    /// Unix seconds at submission.
    pub created: u64,
}

/// Terminal result of [`crate::BananaClient::run`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    /// Job id. Non-string ids are kept in their JSON text form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `None` when the envelope carried no string `message`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_outputs: Option<Value>,
    /// Remaining envelope fields. Empty when the job finished on submission.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobResult {
    /// Keeps only the projected fields of the envelope.
    pub(crate) fn projected(envelope: Value) -> Self {
        let mut result = Self::from_envelope(envelope);
        result.extra.clear();
        result
    }

    /// Converts a whole envelope, keeping unprojected fields in `extra`.
    pub(crate) fn from_envelope(envelope: Value) -> Self {
        let mut fields = match envelope {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };

        let id = fields.remove("id").and_then(|value| match value {
            Value::String(id) => Some(id),
            Value::Null => None,
            other => Some(other.to_string()),
        });
        let message = fields
            .remove("message")
            .and_then(|value| value.as_str().map(str::to_owned));
        let created = fields
            .remove("created")
            .and_then(|value| value.as_i64().or_else(|| value.as_f64().map(|v| v as i64)));
        let api_version = fields
            .remove("apiVersion")
            .and_then(|value| value.as_str().map(str::to_owned));
        let model_outputs = fields.remove("modelOutputs");

        Self {
            id,
            message,
            created,
            api_version,
            model_outputs,
            extra: fields,
        }
    }
}

/// Raw envelope returned by [`crate::BananaClient::check`].
#[derive(Clone, Debug, PartialEq)]
pub struct JobStatus(pub Value);

impl JobStatus {
    pub fn message(&self) -> Option<&str> {
        crate::wire::message(&self.0)
    }

    /// True when `message` is `success`, ignoring case.
    pub fn is_success(&self) -> bool {
        crate::wire::is_success(&self.0)
    }

    pub fn finished(&self) -> bool {
        crate::wire::is_finished(&self.0)
    }

    pub fn call_id(&self) -> Option<&str> {
        crate::wire::call_id(&self.0)
    }

    pub fn model_outputs(&self) -> Option<&Value> {
        self.0.get("modelOutputs")
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{JobResult, JobStatus};

    fn envelope() -> serde_json::Value {
        json!({
            "id": "job-1",
            "message": "success",
            "created": 1_700_000_000,
            "apiVersion": "v4",
            "modelOutputs": [{ "text": "hi" }],
            "callID": "call-9",
            "finished": true
        })
    }

    #[test]
    fn projection_discards_extra_fields() {
        let result = JobResult::projected(envelope());
        assert_eq!(result.id.as_deref(), Some("job-1"));
        assert_eq!(result.message.as_deref(), Some("success"));
        assert_eq!(result.created, Some(1_700_000_000));
        assert_eq!(result.api_version.as_deref(), Some("v4"));
        assert_eq!(result.model_outputs, Some(json!([{ "text": "hi" }])));
        assert!(result.extra.is_empty());
    }

    #[test]
    fn full_envelope_keeps_extra_fields() {
        let result = JobResult::from_envelope(envelope());
        assert_eq!(result.extra.len(), 2);
        assert_eq!(result.extra["callID"], json!("call-9"));
        assert_eq!(result.extra["finished"], json!(true));
    }

    #[test]
    fn serializes_back_to_service_names() {
        let value = serde_json::to_value(JobResult::projected(envelope())).expect("must serialize");
        assert_eq!(
            value,
            json!({
                "id": "job-1",
                "message": "success",
                "created": 1_700_000_000,
                "apiVersion": "v4",
                "modelOutputs": [{ "text": "hi" }]
            })
        );
    }

    #[test]
    fn projection_keeps_absent_fields_absent() {
        let result = JobResult::projected(json!({ "id": 17, "finished": true }));
        assert_eq!(result.id.as_deref(), Some("17"));
        assert_eq!(result.message, None);
        assert_eq!(result.created, None);
        assert_eq!(
            serde_json::to_value(&result).expect("must serialize"),
            json!({ "id": "17" })
        );
    }

    #[test]
    fn status_accessors() {
        let status = JobStatus(json!({ "message": "Success", "callID": "c", "modelOutputs": {"x": 1} }));
        assert!(status.is_success());
        assert!(!status.finished());
        assert_eq!(status.call_id(), Some("c"));
        assert_eq!(status.model_outputs(), Some(&json!({ "x": 1 })));
    }
}

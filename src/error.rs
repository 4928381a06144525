/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network or request execution error from `reqwest`. Never retried.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// A reachable server answered 200 with a body that is not usable JSON.
    #[error("malformed response (status {status}): {reason}; body: {body}")]
    MalformedResponse {
        status: u16,
        reason: String,
        body: String,
    },
    /// The retry budget elapsed before the call produced a terminal outcome.
    #[error("retry timeout exceeded after {attempts} attempts ({elapsed_ms} ms elapsed, budget {budget_ms} ms)")]
    RetryTimeoutExceeded {
        elapsed_ms: u64,
        budget_ms: u64,
        attempts: u32,
        /// Status of the last retryable response seen, if any.
        last_status: Option<u16>,
    },
    /// The service rejected the call with a status that ends it.
    #[error("request rejected with status {status}: {message}")]
    ClientRejected {
        status: u16,
        /// Classification-specific message.
        message: String,
        /// Raw response body.
        body: String,
    },
    /// The service answered 200 but the envelope reports a failed job.
    #[error("remote job error: {message}")]
    RemoteJobError {
        message: String,
        /// Full parsed envelope.
        body: serde_json::Value,
    },
}

impl ClientError {
    /// HTTP status attached to the error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            Self::MalformedResponse { status, .. } | Self::ClientRejected { status, .. } => {
                Some(*status)
            }
            Self::RetryTimeoutExceeded { last_status, .. } => *last_status,
            Self::RemoteJobError { .. } => Some(200),
        }
    }

    /// Raw response body, when one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { body, .. } | Self::ClientRejected { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }

    pub fn is_retry_timeout(&self) -> bool {
        matches!(self, Self::RetryTimeoutExceeded { .. })
    }

    pub fn is_remote_job_error(&self) -> bool {
        matches!(self, Self::RemoteJobError { .. })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::ClientError;

    #[test]
    fn rejected_exposes_status_and_body() {
        let err = ClientError::ClientRejected {
            status: 401,
            message: "bad key".to_owned(),
            body: "bad key".to_owned(),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), Some("bad key"));
        assert!(!err.is_retry_timeout());
    }

    #[test]
    fn remote_job_error_display_uses_message() {
        let err = ClientError::RemoteJobError {
            message: "internal error: out of memory".to_owned(),
            body: json!({ "message": "internal error: out of memory" }),
        };
        assert_eq!(err.to_string(), "remote job error: internal error: out of memory");
        assert!(err.is_remote_job_error());
        assert_eq!(err.body(), None);
    }

    #[test]
    fn retry_timeout_reports_last_status() {
        let err = ClientError::RetryTimeoutExceeded {
            elapsed_ms: 12,
            budget_ms: 10,
            attempts: 3,
            last_status: Some(503),
        };
        assert!(err.is_retry_timeout());
        assert_eq!(err.status(), Some(503));
    }
}

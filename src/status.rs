//! Status-code classification for responses from the inference service.
//!
//! The class decides retry eligibility; the numeric code only selects the
//! class.

/// Explanation appended to 423 bodies when retries are disabled.
pub const LOCKED_EXPLANATION: &str = "423 errors are returned by Potassium when your server(s) are all busy handling GPU endpoints.\nIn most cases, you just want to retry later. Calling with retry enabled handles this for you.";

/// Fixed message for 418.
pub const TEAPOT_MESSAGE: &str = "banana is a teapot";

/// Message for 504.
pub const GATEWAY_TIMEOUT_MESSAGE: &str = "gateway timeout: the job did not finish within the synchronous request window. Submit it with `start` and poll with `check` instead of waiting on a single call.";

/// What the executor does with a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Retryable,
    Fatal,
}

/// Classification of a response status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    /// 200.
    Success,
    /// 400: the caller is at its concurrency quota.
    QuotaExceeded,
    /// 401, 404, 413: bad auth, unknown route, payload too large.
    Rejected(u16),
    /// 418.
    Teapot,
    /// 423: every replica is busy.
    Locked,
    /// 500: the caller's own job code failed.
    JobFailed,
    /// 503: transient service-side error.
    Unavailable,
    /// 504.
    GatewayTimeout,
    /// Anything not listed above.
    Unexpected(u16),
}

impl StatusClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => Self::Success,
            400 => Self::QuotaExceeded,
            401 | 404 | 413 => Self::Rejected(status),
            418 => Self::Teapot,
            423 => Self::Locked,
            500 => Self::JobFailed,
            503 => Self::Unavailable,
            504 => Self::GatewayTimeout,
            other => Self::Unexpected(other),
        }
    }

    pub fn outcome(self) -> Outcome {
        match self {
            Self::Success => Outcome::Success,
            Self::QuotaExceeded | Self::Locked | Self::Unavailable => Outcome::Retryable,
            Self::Rejected(_)
            | Self::Teapot
            | Self::JobFailed
            | Self::GatewayTimeout
            | Self::Unexpected(_) => Outcome::Fatal,
        }
    }

    pub fn is_retryable(self) -> bool {
        self.outcome() == Outcome::Retryable
    }

    /// Message carried by the rejection for this class.
    ///
    /// Retryable classes only reach this when retries are disabled.
    pub fn rejection_message(self, body: &str) -> String {
        match self {
            Self::Teapot => TEAPOT_MESSAGE.to_owned(),
            Self::Locked => format!("{body}{LOCKED_EXPLANATION}"),
            Self::GatewayTimeout => GATEWAY_TIMEOUT_MESSAGE.to_owned(),
            Self::Unexpected(status) => format!("unexpected HTTP response code: {status}"),
            Self::Success
            | Self::QuotaExceeded
            | Self::Rejected(_)
            | Self::JobFailed
            | Self::Unavailable => body.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Outcome, StatusClass, LOCKED_EXPLANATION, TEAPOT_MESSAGE};

    #[test]
    fn table_maps_every_listed_status() {
        let table = [
            (200, Outcome::Success),
            (400, Outcome::Retryable),
            (401, Outcome::Fatal),
            (404, Outcome::Fatal),
            (413, Outcome::Fatal),
            (418, Outcome::Fatal),
            (423, Outcome::Retryable),
            (500, Outcome::Fatal),
            (503, Outcome::Retryable),
            (504, Outcome::Fatal),
        ];
        for (status, outcome) in table {
            assert_eq!(
                StatusClass::from_status(status).outcome(),
                outcome,
                "status {status}"
            );
        }
    }

    #[test]
    fn unmapped_statuses_are_fatal_unexpected() {
        for status in [0, 201, 204, 301, 402, 429, 502, 599] {
            let class = StatusClass::from_status(status);
            assert_eq!(class, StatusClass::Unexpected(status));
            assert_eq!(class.outcome(), Outcome::Fatal);
            assert_eq!(
                class.rejection_message("ignored"),
                format!("unexpected HTTP response code: {status}")
            );
        }
    }

    #[test]
    fn teapot_ignores_body() {
        assert_eq!(
            StatusClass::from_status(418).rejection_message("anything"),
            TEAPOT_MESSAGE
        );
    }

    #[test]
    fn locked_appends_explanation() {
        let message = StatusClass::Locked.rejection_message("busy. ");
        assert!(message.starts_with("busy. "));
        assert!(message.ends_with(LOCKED_EXPLANATION));
    }

    #[test]
    fn gateway_timeout_recommends_background_completion() {
        let message = StatusClass::GatewayTimeout.rejection_message("");
        assert!(message.contains("start"));
        assert!(message.contains("check"));
    }
}

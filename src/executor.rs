use std::time::Duration;

use reqwest::{header, header::HeaderMap, Method};
use serde::Serialize;
use tokio::time::sleep;
use uuid::Uuid;

use crate::{
    backoff::Backoff,
    options::join_url,
    status::{Outcome, StatusClass},
    ClientError, ClientOptions, EndpointConfig, Result,
};

/// Header carrying the per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Banana-Request-Id";

/// One logical call: route, body, headers and retry policy.
///
/// Retry flag and budget left unset fall back to the executor's
/// [`ClientOptions`].
#[derive(Clone, Debug)]
pub struct CallRequest<B = serde_json::Value> {
    method: Method,
    route: String,
    payload: Option<B>,
    headers: Vec<(String, String)>,
    retry: Option<bool>,
    timeout_budget: Option<Duration>,
    correlation_id: Option<Uuid>,
}

impl CallRequest<serde_json::Value> {
    /// Creates a bodiless GET call.
    pub fn get(route: impl Into<String>) -> Self {
        Self::with_method(Method::GET, route, None)
    }
}

impl<B: Serialize> CallRequest<B> {
    /// Creates a POST call with a JSON body.
    pub fn post(route: impl Into<String>, payload: B) -> Self {
        Self::with_method(Method::POST, route, Some(payload))
    }

    fn with_method(method: Method, route: impl Into<String>, payload: Option<B>) -> Self {
        Self {
            method,
            route: route.into(),
            payload,
            headers: Vec::new(),
            retry: None,
            timeout_budget: None,
            correlation_id: None,
        }
    }

    /// Adds a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a header unless one with the same name (case-insensitive) is set.
    pub(crate) fn default_header(self, name: &str, value: &str) -> Self {
        if self.header_value(name).is_some() {
            self
        } else {
            self.header(name, value)
        }
    }

    fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Enables or disables retries of retryable statuses.
    pub fn retry(mut self, retry: bool) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets the overall time budget across retries.
    pub fn timeout_budget(mut self, budget: Duration) -> Self {
        self.timeout_budget = Some(budget);
        self
    }

    /// Pins the correlation id instead of generating one for this call.
    ///
    /// A [`REQUEST_ID_HEADER`] set through [`CallRequest::header`] is sent
    /// as-is in place of the generated one.
    pub fn correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn route(&self) -> &str {
        &self.route
    }
}

/// Response metadata returned next to the parsed body.
#[derive(Clone, Debug)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: HeaderMap,
    /// Number of HTTP round trips, including the successful one.
    pub attempts: u32,
    /// Correlation id sent with every attempt.
    pub request_id: Uuid,
    pub elapsed: Duration,
}

/// Parsed JSON body plus metadata of a successful call.
#[derive(Clone, Debug)]
pub struct CallResponse {
    pub json: serde_json::Value,
    pub meta: ResponseMeta,
}

/// Issues calls against one base URL, retrying retryable statuses with
/// exponential backoff inside a time budget.
#[derive(Clone, Debug)]
pub struct Executor {
    http: reqwest::Client,
    base_url: String,
    options: ClientOptions,
}

impl Executor {
    pub fn new(endpoint: &EndpointConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: endpoint.resolve(),
            options: ClientOptions::default(),
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Absolute URL for `route`.
    pub fn endpoint(&self, route: &str) -> String {
        join_url(&self.base_url, route)
    }

    /// Runs one logical call to completion.
    ///
    /// Transport failures surface immediately. Retryable statuses are
    /// retried only when the call allows it, and only until the budget runs
    /// out. The first attempt is always sent; the budget is checked before
    /// every retry, never mid-sleep.
    pub async fn call<B: Serialize>(&self, request: CallRequest<B>) -> Result<CallResponse> {
        let url = self.endpoint(&request.route);
        let request_id = request
            .correlation_id
            .or_else(|| {
                request
                    .header_value(REQUEST_ID_HEADER)
                    .and_then(|value| Uuid::parse_str(value.trim()).ok())
            })
            .unwrap_or_else(Uuid::new_v4);
        let retry = request.retry.unwrap_or(self.options.retry);
        let budget = request
            .timeout_budget
            .unwrap_or_else(|| self.options.retry_timeout());
        let mut backoff = Backoff::new(
            Duration::from_millis(self.options.retry_backoff_ms),
            Duration::from_millis(self.options.max_retry_backoff_ms),
            budget,
        );
        let mut attempts = 0u32;
        let mut last_status = None;

        loop {
            // The budget bounds retries; the first attempt is always sent.
            if attempts > 0 && backoff.is_expired() {
                return Err(ClientError::RetryTimeoutExceeded {
                    elapsed_ms: duration_ms(backoff.elapsed()),
                    budget_ms: duration_ms(budget),
                    attempts,
                    last_status,
                });
            }

            attempts += 1;
            let response = self
                .send_once(&url, &request, request_id)
                .await
                .map_err(ClientError::Transport)?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.text().await.map_err(ClientError::Transport)?;
            let class = StatusClass::from_status(status);

            match class.outcome() {
                Outcome::Success => {
                    let json = serde_json::from_str::<serde_json::Value>(&body).map_err(|err| {
                        ClientError::MalformedResponse {
                            status,
                            reason: format!("invalid JSON: {err}"),
                            body: body.clone(),
                        }
                    })?;
                    return Ok(CallResponse {
                        json,
                        meta: ResponseMeta {
                            status,
                            headers,
                            attempts,
                            request_id,
                            elapsed: backoff.elapsed(),
                        },
                    });
                }
                Outcome::Retryable if retry => {
                    last_status = Some(status);
                    let delay = backoff.next_delay();

                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        status,
                        attempt = attempts,
                        delay_ms = duration_ms(delay),
                        elapsed_ms = duration_ms(backoff.elapsed()),
                        %request_id,
                        "retrying {} after {} ms",
                        url,
                        duration_ms(delay)
                    );

                    sleep(delay).await;
                }
                Outcome::Retryable | Outcome::Fatal => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(status, attempt = attempts, %request_id, "call to {} rejected", url);

                    return Err(ClientError::ClientRejected {
                        status,
                        message: class.rejection_message(&body),
                        body,
                    });
                }
            }
        }
    }

    async fn send_once<B: Serialize>(
        &self,
        url: &str,
        request: &CallRequest<B>,
        request_id: Uuid,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        let mut builder = self.http.request(request.method.clone(), url);

        if request.header_value(REQUEST_ID_HEADER).is_none() {
            builder = builder.header(REQUEST_ID_HEADER, request_id.to_string());
        }

        if let Some(timeout_ms) = self.options.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(payload) = &request.payload {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .json(payload);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder.send().await
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{CallRequest, Executor};
    use crate::EndpointConfig;

    #[test]
    fn endpoint_joins_route_once() {
        let executor = Executor::new(&EndpointConfig::base_url("http://localhost:8000/"));
        assert_eq!(
            executor.endpoint("/check/v4/"),
            "http://localhost:8000/check/v4/"
        );
    }

    #[test]
    fn default_header_does_not_override_caller() {
        let request = CallRequest::post("start/v4/", json!({}))
            .header("x-banana-api-key", "caller")
            .default_header("X-Banana-Api-Key", "default")
            .default_header("X-Banana-Model-Key", "model");

        assert_eq!(
            request.headers,
            vec![
                ("x-banana-api-key".to_owned(), "caller".to_owned()),
                ("X-Banana-Model-Key".to_owned(), "model".to_owned()),
            ]
        );
    }

    #[test]
    fn header_lookup_ignores_case() {
        let request = CallRequest::get("/").header("x-banana-request-id", "abc");
        assert_eq!(request.header_value(super::REQUEST_ID_HEADER), Some("abc"));
        assert_eq!(request.header_value("X-Banana-Api-Key"), None);
    }

    #[test]
    fn get_has_no_payload() {
        let request = CallRequest::get("/projects");
        assert_eq!(request.method(), &reqwest::Method::GET);
        assert!(request.payload.is_none());
        assert_eq!(request.route(), "/projects");
    }
}

use std::fmt;

use serde::Serialize;

use crate::{
    client::{API_KEY_HEADER, MODEL_KEY_HEADER},
    executor::{CallRequest, CallResponse, Executor},
    ClientOptions, EndpointConfig, Result,
};

/// Calls arbitrary routes on a deployed model server with bound keys.
///
/// Responses are returned as the executor produced them; the job-level
/// `message` check applied by [`crate::BananaClient`] is not performed.
#[derive(Clone)]
pub struct ModelClient {
    executor: Executor,
    api_key: String,
    model_key: String,
}

impl fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClient")
            .field("base_url", &self.executor.base_url())
            .field("api_key", &"<redacted>")
            .field("model_key", &self.model_key)
            .field("options", self.executor.options())
            .finish()
    }
}

impl ModelClient {
    /// Creates a client for the model server at `url`.
    pub fn new(
        api_key: impl Into<String>,
        model_key: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::with_endpoint(api_key, model_key, &EndpointConfig::base_url(url))
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        model_key: impl Into<String>,
        endpoint: &EndpointConfig,
    ) -> Self {
        Self {
            executor: Executor::new(endpoint),
            api_key: api_key.into(),
            model_key: model_key.into(),
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.executor = self.executor.with_options(opts);
        self
    }

    /// POSTs `json` to `route` using the configured retry defaults.
    pub async fn call<B: Serialize>(&self, route: &str, json: B) -> Result<CallResponse> {
        self.call_with(CallRequest::post(route, json)).await
    }

    /// Runs a fully specified call. Key headers set by the caller win.
    pub async fn call_with<B: Serialize>(&self, request: CallRequest<B>) -> Result<CallResponse> {
        let request = request
            .default_header(API_KEY_HEADER, &self.api_key)
            .default_header(MODEL_KEY_HEADER, &self.model_key);
        self.executor.call(request).await
    }
}

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    executor::{CallRequest, Executor},
    wire::{self, CheckRequest, StartRequest},
    ClientError, ClientOptions, EndpointConfig, JobHandle, JobResult, JobStatus, Result,
};

/// Route that submits a job.
pub const START_ROUTE: &str = "start/v4/";
/// Route that long-polls a submitted job.
pub const CHECK_ROUTE: &str = "check/v4/";
/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Banana-Api-Key";
/// Header carrying the model key.
pub const MODEL_KEY_HEADER: &str = "X-Banana-Model-Key";

/// Submits inference jobs and waits for them to complete.
#[derive(Clone, Debug)]
pub struct BananaClient {
    executor: Executor,
}

impl BananaClient {
    /// Creates a client for the given endpoint.
    pub fn new(endpoint: EndpointConfig) -> Self {
        Self {
            executor: Executor::new(&endpoint),
        }
    }

    /// Creates a client that talks to `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(EndpointConfig::base_url(base_url))
    }

    /// Creates a client from the environment.
    ///
    /// Reads `BANANA_URL`; `local` targets `http://localhost/`, unset targets
    /// the production service.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use banana_http::BananaClient;
    ///
    /// let client = BananaClient::from_env();
    /// ```
    pub fn from_env() -> Self {
        Self::new(EndpointConfig::from_env())
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.executor = self.executor.with_options(opts);
        self
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Runs a job and returns once it has succeeded.
    ///
    /// A job that finishes on submission yields only the projected result
    /// fields. Otherwise the job is long-polled until its `message` reads
    /// `success`; polling is bounded only by each check call's retry budget.
    pub async fn run<I>(&self, api_key: &str, model_key: &str, model_inputs: &I) -> Result<JobResult>
    where
        I: Serialize + ?Sized,
    {
        let request_id = Uuid::new_v4();
        let created = wire::unix_now();
        let envelope = self
            .submit(api_key, model_key, model_inputs, false, request_id, created)
            .await?;

        if wire::is_finished(&envelope) {
            return Ok(JobResult::projected(envelope));
        }

        let handle = Self::handle_from(envelope, request_id, created)?;
        self.wait(api_key, &handle).await
    }

    /// Submits a job without waiting and returns its call id.
    pub async fn start<I>(&self, api_key: &str, model_key: &str, model_inputs: &I) -> Result<String>
    where
        I: Serialize + ?Sized,
    {
        self.start_job(api_key, model_key, model_inputs)
            .await
            .map(|handle| handle.call_id)
    }

    /// Submits a job without waiting and returns its full handle.
    pub async fn start_job<I>(
        &self,
        api_key: &str,
        model_key: &str,
        model_inputs: &I,
    ) -> Result<JobHandle>
    where
        I: Serialize + ?Sized,
    {
        let request_id = Uuid::new_v4();
        let created = wire::unix_now();
        let envelope = self
            .submit(api_key, model_key, model_inputs, true, request_id, created)
            .await?;
        Self::handle_from(envelope, request_id, created)
    }

    /// Long-polls a job once and returns the raw envelope.
    pub async fn check(&self, api_key: &str, call_id: &str) -> Result<JobStatus> {
        self.poll(api_key, call_id, Uuid::new_v4(), wire::unix_now())
            .await
            .map(JobStatus)
    }

    /// Long-polls a started job until its `message` reads `success`.
    pub async fn wait(&self, api_key: &str, handle: &JobHandle) -> Result<JobResult> {
        let mut polls = 0u64;
        loop {
            let envelope = self
                .poll(api_key, &handle.call_id, handle.request_id, handle.created)
                .await?;
            polls += 1;

            if wire::is_success(&envelope) {
                return Ok(JobResult::from_envelope(envelope));
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                call_id = %handle.call_id,
                request_id = %handle.request_id,
                polls,
                message = wire::message(&envelope).unwrap_or_default(),
                "job not finished, polling again"
            );

            #[cfg(not(feature = "tracing"))]
            let _ = polls;
        }
    }

    async fn submit<I>(
        &self,
        api_key: &str,
        model_key: &str,
        model_inputs: &I,
        start_only: bool,
        request_id: Uuid,
        created: u64,
    ) -> Result<Value>
    where
        I: Serialize + ?Sized,
    {
        let body = StartRequest {
            id: request_id,
            created,
            api_key,
            model_key,
            model_inputs,
            start_only,
        };
        let request = CallRequest::post(START_ROUTE, body)
            .header(API_KEY_HEADER, api_key)
            .header(MODEL_KEY_HEADER, model_key)
            .correlation_id(request_id);

        let response = self.executor.call(request).await?;
        wire::ensure_job_ok(response.json)
    }

    async fn poll(
        &self,
        api_key: &str,
        call_id: &str,
        request_id: Uuid,
        created: u64,
    ) -> Result<Value> {
        let body = CheckRequest {
            id: request_id,
            created,
            long_poll: true,
            api_key,
            call_id,
        };
        let request = CallRequest::post(CHECK_ROUTE, body)
            .header(API_KEY_HEADER, api_key)
            .correlation_id(request_id);

        let response = self.executor.call(request).await?;
        wire::ensure_job_ok(response.json)
    }

    fn handle_from(envelope: Value, request_id: Uuid, created: u64) -> Result<JobHandle> {
        match wire::call_id(&envelope) {
            Some(call_id) => Ok(JobHandle {
                call_id: call_id.to_owned(),
                request_id,
                created,
            }),
            None => Err(ClientError::MalformedResponse {
                status: 200,
                reason: "unfinished job response has no callID".to_owned(),
                body: envelope.to_string(),
            }),
        }
    }
}

//! `banana-http` is an async HTTP client for Banana inference jobs.
//!
//! Every request goes through one [`Executor`], which classifies the response
//! status, retries retryable statuses with exponential backoff inside a time
//! budget, and parses the JSON body. On top of it:
//! - [`BananaClient::run`] submits a job and long-polls it until it succeeds
//! - [`BananaClient::start`] / [`BananaClient::check`] expose the two halves
//! - [`ModelClient::call`] reaches arbitrary routes on a model server

mod backoff;
mod client;
mod error;
mod executor;
mod model;
mod options;
mod status;
mod types;
mod wire;

pub use backoff::Backoff;
pub use client::{BananaClient, API_KEY_HEADER, CHECK_ROUTE, MODEL_KEY_HEADER, START_ROUTE};
pub use error::ClientError;
pub use executor::{CallRequest, CallResponse, Executor, ResponseMeta, REQUEST_ID_HEADER};
pub use model::ModelClient;
pub use options::{ClientOptions, EndpointConfig, BASE_URL_ENV, DEFAULT_BASE_URL, LOCAL_BASE_URL};
pub use status::{Outcome, StatusClass};
pub use types::{JobHandle, JobResult, JobStatus};

pub type Result<T> = std::result::Result<T, ClientError>;

use std::time::Duration;

/// Production service location.
pub const DEFAULT_BASE_URL: &str = "https://api.banana.dev/";
/// Loopback address selected by the `local` alias.
pub const LOCAL_BASE_URL: &str = "http://localhost/";
/// Environment variable read by [`EndpointConfig::from_env`].
pub const BASE_URL_ENV: &str = "BANANA_URL";

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds. `None` leaves long-poll requests
    /// open until the server answers.
    pub request_timeout_ms: Option<u64>,
    /// Whether retryable statuses are retried when a call does not say.
    pub retry: bool,
    /// Overall retry budget per call, in milliseconds.
    pub retry_timeout_ms: u64,
    /// Initial retry backoff in milliseconds (doubled after every retry).
    pub retry_backoff_ms: u64,
    /// Ceiling for the retry backoff in milliseconds.
    pub max_retry_backoff_ms: u64,
}

impl ClientOptions {
    pub(crate) fn retry_timeout(&self) -> Duration {
        Duration::from_millis(self.retry_timeout_ms)
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout_ms: None,
            retry: true,
            retry_timeout_ms: 300_000,
            retry_backoff_ms: 100,
            max_retry_backoff_ms: 10_000,
        }
    }
}

/// Where calls are sent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EndpointConfig {
    /// Overrides the production service location.
    pub base_url: Option<String>,
    /// Redirects every call to [`LOCAL_BASE_URL`]. Wins over `base_url`.
    pub local: bool,
}

impl EndpointConfig {
    /// Targets an explicit base URL.
    pub fn base_url(url: impl Into<String>) -> Self {
        Self {
            base_url: Some(url.into()),
            local: false,
        }
    }

    /// Targets a model server on the loopback interface.
    pub fn local() -> Self {
        Self {
            base_url: None,
            local: true,
        }
    }

    /// Reads `BANANA_URL`.
    ///
    /// Unset or blank keeps the production endpoint; the literal value
    /// `local` selects the loopback alias; anything else is used verbatim.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(BASE_URL_ENV).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::default(),
            Some(value) if value.eq_ignore_ascii_case("local") => Self::local(),
            Some(value) => Self::base_url(value),
        }
    }

    /// Returns the base URL calls are composed against.
    pub fn resolve(&self) -> String {
        if self.local {
            return LOCAL_BASE_URL.to_owned();
        }
        match self.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_owned(),
            _ => DEFAULT_BASE_URL.to_owned(),
        }
    }
}

/// Joins a base URL and a route with exactly one separating slash.
pub(crate) fn join_url(base: &str, route: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::{join_url, EndpointConfig, DEFAULT_BASE_URL, LOCAL_BASE_URL};

    #[test]
    fn join_normalizes_slashes() {
        let expected = "https://api.banana.dev/start/v4/";
        assert_eq!(join_url("https://api.banana.dev/", "/start/v4/"), expected);
        assert_eq!(join_url("https://api.banana.dev", "start/v4/"), expected);
        assert_eq!(join_url("https://api.banana.dev/", "start/v4/"), expected);
        assert_eq!(join_url("https://api.banana.dev", "/start/v4/"), expected);
    }

    #[test]
    fn resolve_defaults_to_production() {
        assert_eq!(EndpointConfig::default().resolve(), DEFAULT_BASE_URL);
        assert_eq!(EndpointConfig::base_url("  ").resolve(), DEFAULT_BASE_URL);
    }

    #[test]
    fn local_alias_wins_over_override() {
        let config = EndpointConfig {
            base_url: Some("https://example.test".to_owned()),
            local: true,
        };
        assert_eq!(config.resolve(), LOCAL_BASE_URL);
    }

    #[test]
    fn env_value_parsing() {
        assert_eq!(EndpointConfig::from_value(None), EndpointConfig::default());
        assert_eq!(EndpointConfig::from_value(Some("local")), EndpointConfig::local());
        assert_eq!(
            EndpointConfig::from_value(Some("http://10.0.0.5:8000/")),
            EndpointConfig::base_url("http://10.0.0.5:8000/")
        );
    }
}

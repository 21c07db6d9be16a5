//! HTTP boundary to the roll-call records portal.
//!
//! All documents are fetched through [`SourceClient`], which resolves links
//! against the configured origin, bounds each request with a timeout, and
//! applies the optional retry policy from [`SourceConfig`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::config::SourceConfig;
use crate::error::{Result, RollCallError};

/// User-Agent string for portal requests.
const USER_AGENT: &str = concat!("RollCall/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Fetches documents from one origin.
#[derive(Debug, Clone)]
pub struct SourceClient {
    client: Client,
    origin: Url,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
    rate_limit: Duration,
}

impl SourceClient {
    /// Create a client for the configured origin.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let origin = Url::parse(&config.origin).map_err(|e| {
            RollCallError::config(format!("invalid source origin '{}': {e}", config.origin))
        })?;
        if origin.cannot_be_a_base() {
            return Err(RollCallError::config(format!(
                "source origin '{origin}' cannot resolve relative links"
            )));
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| RollCallError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            origin,
            timeout,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            rate_limit: Duration::from_millis(config.rate_limit_ms),
        })
    }

    /// The portal origin links are resolved against.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Politeness pause configured for detail requests.
    pub fn rate_limit(&self) -> Duration {
        self.rate_limit
    }

    /// Resolve a relative or absolute link against the origin.
    pub fn resolve(&self, link: &str) -> Result<Url> {
        self.origin
            .join(link)
            .map_err(|e| RollCallError::parse(link, format!("invalid link: {e}")))
    }

    /// GET a document body, retrying transient failures per the retry policy.
    pub async fn fetch_document(&self, url: &Url) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(failure) if failure.retryable && attempt < self.max_retries => {
                    let delay = self
                        .retry_backoff
                        .saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        %url,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis(),
                        error = %failure.message,
                        "fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(failure) => return Err(RollCallError::fetch(url.as_str(), failure.message)),
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> std::result::Result<String, FetchFailure> {
        debug!(%url, "fetching document");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("HTTP {status}");
            return Err(if is_retryable_status(status) {
                FetchFailure::transient(message)
            } else {
                FetchFailure::permanent(message)
            });
        }

        response
            .text()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.transport_failure(e)
                } else {
                    FetchFailure::transient(format!("body read failed: {e}"))
                }
            })
    }

    fn transport_failure(&self, e: reqwest::Error) -> FetchFailure {
        if e.is_timeout() {
            FetchFailure::transient(format!("timed out after {}s", self.timeout.as_secs()))
        } else {
            FetchFailure::transient(e.to_string())
        }
    }
}

/// One failed attempt, classified for the retry loop.
struct FetchFailure {
    message: String,
    retryable: bool,
}

impl FetchFailure {
    fn transient(message: String) -> Self {
        Self {
            message,
            retryable: true,
        }
    }

    fn permanent(message: String) -> Self {
        Self {
            message,
            retryable: false,
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(origin: &str, max_retries: u32) -> SourceConfig {
        SourceConfig {
            origin: origin.to_string(),
            timeout_secs: 5,
            max_retries,
            retry_backoff_ms: 1,
            rate_limit_ms: 0,
            concurrency: 1,
        }
    }

    #[test]
    fn resolve_relative_and_absolute_links() {
        let client = SourceClient::new(&SourceConfig::from(&AppConfig::default())).unwrap();
        let url = client
            .resolve("/legislative/LIS/roll_call_votes/vote1171/vote_117_1_00001.htm")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.senate.gov/legislative/LIS/roll_call_votes/vote1171/vote_117_1_00001.htm"
        );

        let abs = client.resolve("https://mirror.example.org/a.htm").unwrap();
        assert_eq!(abs.host_str(), Some("mirror.example.org"));
    }

    #[test]
    fn invalid_origin_is_config_error() {
        let err = SourceClient::new(&config_for("not a url", 0)).unwrap_err();
        assert_eq!(err.stage(), "config");
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.htm"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = SourceClient::new(&config_for(&server.uri(), 3)).unwrap();
        let url = client.resolve("/missing.htm").unwrap();
        let err = client.fetch_document(&url).await.unwrap_err();

        assert!(matches!(err, RollCallError::Fetch { .. }));
        assert!(err.to_string().contains("404"));
        // 404 is permanent: exactly one request despite max_retries = 3
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn server_errors_are_retried_up_to_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky.htm"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = SourceClient::new(&config_for(&server.uri(), 2)).unwrap();
        let url = client.resolve("/flaky.htm").unwrap();
        let err = client.fetch_document(&url).await.unwrap_err();

        assert_eq!(err.stage(), "fetch");
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn retry_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page.htm"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page.htm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let client = SourceClient::new(&config_for(&server.uri(), 1)).unwrap();
        let url = client.resolve("/page.htm").unwrap();
        let body = client.fetch_document(&url).await.unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn slow_response_times_out_and_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.htm"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html>late</html>")
                    .set_delay(Duration::from_millis(2500)),
            )
            .mount(&server)
            .await;

        let mut config = config_for(&server.uri(), 1);
        config.timeout_secs = 1;
        let client = SourceClient::new(&config).unwrap();
        let url = client.resolve("/slow.htm").unwrap();
        let err = client.fetch_document(&url).await.unwrap_err();

        assert!(matches!(err, RollCallError::Fetch { .. }));
        assert!(err.to_string().contains("timed out after 1s"));
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }
}

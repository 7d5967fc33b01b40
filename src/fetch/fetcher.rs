//! Retrying HTTP fetcher
//!
//! This module performs every GET the crate makes against the origin API and
//! the CDN mirror:
//! - Building HTTP clients with a proper user agent string
//! - Per-request timeouts
//! - Error classification (client vs. transport)
//! - Bounded retries with exponential backoff

use crate::config::UserAgentConfig;
use crate::fetch::RetryPolicy;
use crate::region::RegionEnvelope;
use crate::{FetchError, FetchResult};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// A successful (2xx) response
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL that was requested
    pub url: Url,

    /// HTTP status code
    pub status: u16,

    /// Raw response body
    pub body: Vec<u8>,

    /// Number of attempts it took, starting at 1
    pub attempts: u32,

    /// Backoff delays slept between attempts, in order
    pub backoff: Vec<Duration>,
}

impl FetchResponse {
    /// Decodes the body as a region listing
    pub fn envelope(&self) -> Result<RegionEnvelope, serde_json::Error> {
        RegionEnvelope::from_slice(&self.body)
    }
}

/// Returns a client builder with the crate's common settings
pub(crate) fn client_builder(config: &UserAgentConfig) -> ClientBuilder {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
}

/// Builds an HTTP client with proper configuration
///
/// Request timeouts are not set here; every call passes its own.
///
/// # Example
///
/// ```no_run
/// use wilayah::config::UserAgentConfig;
/// use wilayah::fetch::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    client_builder(config).build()
}

/// Performs GETs with bounded retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return immediately |
/// | HTTP 4xx | Immediate → `FetchError::Client`, no retry |
/// | HTTP 5xx / other status | Retry with backoff |
/// | Timeout / connection error | Retry with backoff |
/// | Attempts exhausted | `FetchError::Exhausted` |
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches `url`, retrying transient failures according to `policy`
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to GET
    /// * `timeout` - Timeout for each individual attempt
    /// * `policy` - Attempt count and backoff schedule
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResponse)` - A 2xx response and its body
    /// * `Err(FetchError::Client)` - A 4xx response (exactly one request made)
    /// * `Err(FetchError::Exhausted)` - Every attempt failed transiently
    pub async fn fetch(
        &self,
        url: &Url,
        timeout: Duration,
        policy: &RetryPolicy,
    ) -> FetchResult<FetchResponse> {
        let max_attempts = policy.attempts();
        let mut backoff = Vec::new();
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.attempt(url, timeout).await {
                Ok((status, body)) => {
                    return Ok(FetchResponse {
                        url: url.clone(),
                        status,
                        body,
                        attempts: attempt,
                        backoff,
                    });
                }
                Err(FetchError::Client { url, status }) => {
                    tracing::warn!("   [CLIENT ERROR] ({}): {}", status, url);
                    return Err(FetchError::Client { url, status });
                }
                Err(e) => {
                    tracing::warn!("   [RETRY] Attempt {} failed: {}", attempt, e);

                    if attempt >= max_attempts {
                        return Err(FetchError::Exhausted {
                            url: url.to_string(),
                            attempts: attempt,
                            last: e.to_string(),
                        });
                    }

                    let wait = policy.delay_after(attempt);
                    tokio::time::sleep(wait).await;
                    backoff.push(wait);
                }
            }
        }
    }

    /// Makes a single request and classifies the outcome
    async fn attempt(&self, url: &Url, timeout: Duration) -> FetchResult<(u16, Vec<u8>)> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();

        if status.is_client_error() {
            return Err(FetchError::Client {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::Transport {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?;

        Ok((status.as_u16(), body.to_vec()))
    }
}

/// Classifies a reqwest error as a transport failure
fn transport_error(url: &Url, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}

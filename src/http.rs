//! HTTP client shared by the crawl and transform stages
//!
//! Every request made by the chef goes through one `HttpClient`, which owns the
//! underlying reqwest client and a rate limiter so the target site is crawled
//! politely. Page fetches are best-effort: a non-success status is logged and
//! the body is still returned for parsing.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client as ReqwestClient;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Options for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// User agent sent with every request
    pub user_agent: String,

    /// Maximum number of requests per second
    pub requests_per_second: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("nalibali-chef/{}", env!("CARGO_PKG_VERSION")),
            requests_per_second: 4,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Rate-limited HTTP client used for pages, feeds, images and probes
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Limiter shared by all clones of this client
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with default options
    pub fn new() -> reqwest::Result<Self> {
        Self::with_options(HttpOptions::default())
    }

    /// Create a new HTTP client with custom options
    pub fn with_options(options: HttpOptions) -> reqwest::Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(options.user_agent)
            .build()?;

        let rate = NonZeroU32::new(options.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            limiter: Arc::new(limiter),
        })
    }

    /// Fetch a page or feed body as text.
    ///
    /// Non-success responses are logged and their body is returned anyway.
    #[instrument(skip(self), fields(url = %url), level = "debug")]
    pub async fn get_text(&self, url: &Url) -> reqwest::Result<String> {
        self.limiter.until_ready().await;
        debug!("Sending GET request to {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("GET {} returned {}", url, status);
        }
        response.text().await
    }

    /// Fetch raw bytes, failing on any non-success status
    #[instrument(skip(self), fields(url = %url), level = "debug")]
    pub async fn get_bytes(&self, url: &Url) -> reqwest::Result<Vec<u8>> {
        self.limiter.until_ready().await;
        debug!("Downloading {}", url);

        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Capability probe: issue a HEAD request and report whether it succeeded
    #[instrument(skip(self), fields(url = %url), level = "debug")]
    pub async fn probe(&self, url: &Url) -> reqwest::Result<bool> {
        self.limiter.until_ready().await;

        let response = self.client.head(url.clone()).send().await?;
        let status = response.status();
        debug!("HEAD {} returned {}", url, status);
        Ok(status.is_success())
    }
}

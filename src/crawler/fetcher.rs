//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Serving earlier downloads from the output directory
//! - Retrying throttled responses after a fixed pause
//! - Pausing after live fetches for politeness
//! - Error classification

use crate::config::{Config, UserAgentConfig};
use crate::storage::Storage;
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
///
/// Callers that only need the `(content, ok)` view use [`FetchResult::ok`]
/// and [`FetchResult::body`].
#[derive(Debug)]
pub enum FetchResult {
    /// Content came from an earlier download; no request was made
    Cached {
        /// Stored document
        body: String,
    },

    /// Successfully fetched the page
    Fetched {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
        /// Requests made, including throttled ones
        attempts: u32,
    },

    /// Every attempt was throttled; the last body is returned anyway
    RateLimited {
        /// Last body received (may still contain the marker)
        body: String,
        /// Requests made
        attempts: u32,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns true if the result carries usable content
    ///
    /// An exhausted rate limit still counts as a soft success.
    pub fn ok(&self) -> bool {
        matches!(
            self,
            Self::Cached { .. } | Self::Fetched { .. } | Self::RateLimited { .. }
        )
    }

    /// Returns the content, or an empty string on failure
    pub fn body(&self) -> &str {
        match self {
            Self::Cached { body } | Self::Fetched { body, .. } | Self::RateLimited { body, .. } => {
                body
            }
            Self::HttpError { .. } | Self::NetworkError { .. } => "",
        }
    }

    /// Consumes the result, returning the content or an empty string
    pub fn into_body(self) -> String {
        match self {
            Self::Cached { body } | Self::Fetched { body, .. } | Self::RateLimited { body, .. } => {
                body
            }
            Self::HttpError { .. } | Self::NetworkError { .. } => String::new(),
        }
    }

    /// Returns true if no request was made
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached { .. })
    }

    /// Number of requests made for this result
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Cached { .. } => 0,
            Self::Fetched { attempts, .. } | Self::RateLimited { attempts, .. } => *attempts,
            Self::HttpError { .. } | Self::NetworkError { .. } => 1,
        }
    }
}

/// How throttled responses are retried
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first throttled response
    pub max_retries: u32,
    /// Fixed pause between attempts
    pub pause: Duration,
    /// Literal text identifying a throttled body
    pub marker: String,
}

impl RetryPolicy {
    /// Returns true if a response should be retried
    pub fn is_rate_limited(&self, status: StatusCode, body: &str) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || body.contains(&self.marker)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use wikicat::config::UserAgentConfig;
/// use wikicat::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "wikicat".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, 30).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches documents, from the output directory when possible
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
    politeness_delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, retry: RetryPolicy, politeness_delay: Duration) -> Self {
        Self {
            client,
            retry,
            politeness_delay,
        }
    }

    /// Builds a fetcher from the crawler configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout)?;
        let retry = RetryPolicy {
            max_retries: config.crawler.max_retries,
            pause: Duration::from_millis(config.crawler.retry_pause_ms),
            marker: config.markers.access_denied.clone(),
        };
        Ok(Self::new(
            client,
            retry,
            Duration::from_secs(config.crawler.url_sleep),
        ))
    }

    /// Fetches a URL, serving a non-empty `cache_file` without a request
    ///
    /// Never fails: transport problems come back as a result with `ok() == false`.
    pub async fn fetch(&self, url: &Url, storage: &dyn Storage, cache_file: &Path) -> FetchResult {
        match storage.read_cached(cache_file) {
            Ok(Some(body)) => {
                tracing::debug!("Using cached copy of {} from {}", url, cache_file.display());
                return FetchResult::Cached { body };
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache for {}: {}", url, e);
            }
        }

        self.fetch_live(url).await
    }

    /// Fetches a URL over the network
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Marker in body or HTTP 429 | Retry after fixed pause, up to `max_retries` times |
    /// | Retries exhausted on marker | Return last body as `RateLimited` |
    /// | Retries exhausted on 429 | HttpError (nothing to store) |
    /// | Other non-2xx status | Immediate → HttpError |
    /// | Timeout / connection error | Immediate → NetworkError |
    pub async fn fetch_live(&self, url: &Url) -> FetchResult {
        let mut attempts = 0;

        loop {
            attempts += 1;
            tracing::debug!("GET {} (attempt {})", url, attempts);

            let response = match self.client.get(url.clone()).send().await {
                Ok(response) => response,
                Err(e) => return network_error(url, e),
            };

            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() && status != StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("HTTP {} for {}", status.as_u16(), url);
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => return network_error(url, e),
            };
            tracing::trace!("Received {} bytes from {}", body.len(), final_url);

            if !self.retry.is_rate_limited(status, &body) {
                self.pause().await;
                return FetchResult::Fetched {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                    attempts,
                };
            }

            if attempts > self.retry.max_retries {
                if status == StatusCode::TOO_MANY_REQUESTS {
                    tracing::warn!("Still HTTP 429 after {} attempts for {}", attempts, url);
                    self.pause().await;
                    return FetchResult::HttpError {
                        status_code: status.as_u16(),
                    };
                }
                tracing::warn!(
                    "Still rate limited after {} attempts for {}; using last response",
                    attempts,
                    url
                );
                self.pause().await;
                return FetchResult::RateLimited { body, attempts };
            }

            tracing::warn!(
                "Access denied for {}; trying again after {:?}",
                url,
                self.retry.pause
            );
            tokio::time::sleep(self.retry.pause).await;
        }
    }

    async fn pause(&self) {
        if !self.politeness_delay.is_zero() {
            tracing::debug!("Pausing for {:?}", self.politeness_delay);
            tokio::time::sleep(self.politeness_delay).await;
        }
    }
}

fn network_error(url: &Url, e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };
    tracing::warn!("Failed to fetch {}: {}", url, error);
    FetchResult::NetworkError { error }
}

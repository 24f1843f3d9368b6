//! HTTP client for fetching search-result pages
//!
//! Provides a reqwest-based client with browser-like headers, a bounded
//! timeout, and cancellation support. Retry policy belongs to the
//! orchestrator, so a single failed request surfaces as a `FetchError`.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::infrastructure::config::defaults;

/// Transport-level failure for a single page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error {status}: {url}")]
    Http { status: StatusCode, url: String },

    #[error("request timed out after {timeout_seconds}s: {url}")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch cancelled: {url}")]
    Cancelled { url: String },
}

/// HTTP client configuration for page fetching.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            follow_redirects: true,
        }
    }
}

/// Page fetcher with a persistent connection pool.
///
/// One instance is meant to live for the duration of a scrape session;
/// the underlying reqwest pool is reused across page fetches.
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(
            "Upgrade-Insecure-Requests",
            HeaderValue::from_static("1"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Fetch a single search-result page and return its raw markup.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching page: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error {} for {}", status, url);
            return Err(FetchError::Http {
                status,
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.classify(url, e))?;

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// Fetch a page, aborting promptly when the token fires.
    ///
    /// Every await point races against the token so a caller-driven abort
    /// never waits out the full request timeout.
    pub async fn fetch_page_with_cancellation(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<String, FetchError> {
        if token.is_cancelled() {
            return Err(FetchError::Cancelled {
                url: url.to_string(),
            });
        }

        let response = tokio::select! {
            result = self.client.get(url).send() => {
                result.map_err(|e| self.classify(url, e))?
            }
            _ = token.cancelled() => {
                warn!("Fetch cancelled for {}", url);
                return Err(FetchError::Cancelled { url: url.to_string() });
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error {} for {}", status, url);
            return Err(FetchError::Http {
                status,
                url: url.to_string(),
            });
        }

        let body = tokio::select! {
            result = response.text() => {
                result.map_err(|e| self.classify(url, e))?
            }
            _ = token.cancelled() => {
                warn!("Body read cancelled for {}", url);
                return Err(FetchError::Cancelled { url: url.to_string() });
            }
        };

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    fn classify(&self, url: &str, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_seconds: self.config.timeout_seconds,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new(HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_default_config_matches_fetch_contract() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout_seconds, 10);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.follow_redirects);
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits_fetch() {
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = client
            .fetch_page_with_cancellation("https://www.ebay.com/sch/i.html", &token)
            .await;
        assert!(matches!(result, Err(FetchError::Cancelled { .. })));
    }
}

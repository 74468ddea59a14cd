//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests returning the decoded page body
//! - Error classification into [`FetchError`] variants
//!
//! Fetches are never retried; the coordinator decides what a failure means.

use crate::config::Config;
use crate::FetchError;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Source of raw page HTML
///
/// The coordinator only talks to this trait, so crawls can run against a
/// canned set of pages in tests.
pub trait PageFetcher {
    /// Retrieves the HTML body at `url`
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// [`PageFetcher`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    fallback_charset: String,
}

impl HttpFetcher {
    /// Creates a fetcher from the crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Client built successfully
    /// * `Err(reqwest::Error)` - The TLS backend or client failed to initialize
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent.header_value(),
            Duration::from_secs(config.crawler.timeout_secs),
        )?;

        Ok(Self::new(client, config.crawler.fallback_charset.clone()))
    }

    pub fn new(client: Client, fallback_charset: impl Into<String>) -> Self {
        Self {
            client,
            fallback_charset: fallback_charset.into(),
        }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_url(&self.client, url, &self.fallback_charset).await
    }
}

/// Builds an HTTP client with a bounded total timeout
///
/// # Example
///
/// ```no_run
/// use pokedex_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("PokedexHarvest/0.1", Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and decodes its body
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | Timeout (connect or total) | `FetchError::Timeout` |
/// | Connection refused / DNS / TLS | `FetchError::Connect` |
/// | Non-2xx status | `FetchError::Status` |
/// | Body could not be read | `FetchError::Body` |
/// | Anything else | `FetchError::Transport` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The absolute URL to fetch
/// * `fallback_charset` - Charset used when the response declares none
pub async fn fetch_url(
    client: &Client,
    url: &str,
    fallback_charset: &str,
) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_send_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .text_with_charset(fallback_charset)
        .await
        .map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })
}

fn classify_send_error(url: &str, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() {
        FetchError::Connect { url, source: error }
    } else {
        FetchError::Transport { url, source: error }
    }
}

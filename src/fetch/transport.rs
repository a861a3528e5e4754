//! Transport seam for the confirmation flow.
//!
//! The engine talks HTTP only through the [`Transport`] trait so tests can
//! substitute scripted doubles. The production implementation
//! ([`HttpTransport`]) wraps a reqwest client configured the way a one-shot
//! scraping flow needs it: redirects followed transparently, gzip enabled,
//! conservative connect/read timeouts.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use thiserror::Error;
use tracing::{debug, instrument};

/// Connect timeout for transport requests (seconds).
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Read timeout for transport requests (seconds). Large files can take a
/// while; the confirmation flow buffers whole bodies.
const READ_TIMEOUT_SECS: u64 = 300;

/// Errors surfaced by a transport call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS resolution, connection refused, TLS, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl TransportError {
    /// Creates a network error from a reqwest error, mapping timeouts to
    /// their own variant.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }
}

/// HTTP operations the confirmation flow consumes.
///
/// Implementations must follow redirects transparently; the sharing host
/// bounces the content request through several hops before the final body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET and returns the raw response body.
    async fn http_get(&self, url: &str) -> Result<Vec<u8>, TransportError>;

    /// Resolves response headers for a URL, keyed by lowercased header name.
    async fn get_headers(&self, url: &str) -> Result<HashMap<String, String>, TransportError>;
}

/// Production [`Transport`] over a pooled reqwest client.
///
/// Designed to be created once per invocation chain and reused; connection
/// pooling makes the endpoint re-request for headers cheap.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Creates a transport with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a transport with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied timeouts.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self), fields(url = %url))]
    async fn http_get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::http_status(url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;

        debug!(bytes = body.len(), "GET complete");
        Ok(body.to_vec())
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn get_headers(&self, url: &str) -> Result<HashMap<String, String>, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;

        // reqwest header names are already lowercase; values that are not
        // valid UTF-8 are skipped rather than failing the whole lookup.
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Ok(headers)
    }
}

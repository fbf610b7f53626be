//! HTTP client abstraction for wallet API and node requests.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::domain::ClientError;

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Idle connections kept per host
const POOL_MAX_IDLE_PER_HOST: usize = 4;

// ============================================================================
// Configuration
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,
    /// `Referer` header sent with every request, for proxied API access
    pub referer: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            referer: None,
        }
    }
}

impl HttpConfig {
    /// Create config with custom timeout
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            referer: None,
        }
    }

    /// Set the `Referer` header value
    #[must_use]
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// Base HTTP client wrapper
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the TLS backend cannot be initialised.
    pub fn with_config(config: HttpConfig) -> Result<Self, ClientError> {
        let inner = Client::builder()
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { inner, config })
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Build a GET request with standard headers
    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.inner.get(url))
    }

    /// Build a POST request with standard headers
    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.inner.post(url))
    }

    /// GET a URL and read the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` for a non-success status, or
    /// `ClientError::Network` when the request or body read fails.
    pub async fn get_json(&self, url: &str) -> Result<Value, ClientError> {
        tracing::trace!(url, "GET");
        let response = self.get(url).send().await?;
        read_json(url, response).await
    }

    /// POST a JSON body and read the response as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` for a non-success status, or
    /// `ClientError::Network` when the request or body read fails.
    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ClientError> {
        tracing::trace!(url, "POST");
        let response = self.post(url).json(body).send().await?;
        read_json(url, response).await
    }

    /// HEAD a URL and return its `Content-Type`, if any.
    ///
    /// No JSON `accept` header is sent, since the target is usually media.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` for a non-success status, or
    /// `ClientError::Network` when the request fails.
    pub async fn head_content_type(&self, url: &str) -> Result<Option<String>, ClientError> {
        tracing::trace!(url, "HEAD");
        let request = self.inner.head(url).timeout(self.config.timeout);
        let request = match &self.config.referer {
            Some(referer) => request.header("referer", referer),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from))
    }

    fn with_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("accept", "application/json")
            .timeout(self.config.timeout);
        match &self.config.referer {
            Some(referer) => request.header("referer", referer),
            None => request,
        }
    }
}

async fn read_json(url: &str, response: reqwest::Response) -> Result<Value, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.json::<Value>().await?)
}

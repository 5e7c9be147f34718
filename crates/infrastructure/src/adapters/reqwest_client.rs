//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! Request paths are resolved against the configured backend base URL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method};
use sgdis_application::ports::{HttpClient, HttpClientError};
use sgdis_domain::{ApiRequest, ApiResponse, HttpMethod, SessionConfig};
use tracing::debug;
use url::Url;

/// HTTP client implementation using reqwest.
///
/// This is the transport at the bottom of the client stack; it sends
/// exactly what it is given and never adds credentials itself.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ReqwestHttpClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "sgdis/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be
    /// created.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(concat!("sgdis/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self::with_client(client, parse_base_url(base_url)?, timeout))
    }

    /// Creates a client from session settings.
    ///
    /// # Errors
    ///
    /// See [`ReqwestHttpClient::new`].
    pub fn from_config(config: &SessionConfig) -> Result<Self, HttpClientError> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    /// Creates a client around a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            timeout,
        }
    }

    /// Resolves a request path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn url_for(&self, path: &str) -> Result<Url, HttpClientError> {
        self.base_url
            .join(path)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {path}")))
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// Parses a base URL, making sure it ends with a slash so joins keep its path.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, HttpClientError> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };
    Url::parse(&normalized).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {base_url}")))
}

/// Maps reqwest errors to the port's `HttpClientError`.
pub(crate) fn map_error(error: &reqwest::Error, timeout: Duration) -> HttpClientError {
    if error.is_timeout() {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        return HttpClientError::Timeout { timeout_ms };
    }

    if error.is_connect() {
        return HttpClientError::ConnectionFailed(error.to_string());
    }

    if error.is_builder() {
        return HttpClientError::InvalidUrl(error.to_string());
    }

    HttpClientError::Other(error.to_string())
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, HttpClientError> {
        let url = self.url_for(&request.path)?;
        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(self.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_error(&e, self.timeout))?;

        let status = response.status().as_u16();

        // Kept as a list: Set-Cookie may repeat.
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?
            .to_vec();

        let duration = start.elapsed();
        debug!(
            method = %request.method,
            path = %request.path,
            status,
            elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "HTTP request completed"
        );

        Ok(ApiResponse::new(status, headers, body).with_duration(duration))
    }
}

/*
[INPUT]:  HTTP configuration (base URL, timeouts, API key)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::http::{EnhancerError, Result};

/// Base URL for the PicWish API
pub const DEFAULT_BASE_URL: &str = "https://techhk.aoscdn.com";

/// Header carrying the static API key
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Static credential attached to every request
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Main HTTP client for the PicWish API
#[derive(Debug, Clone)]
pub struct PicwishClient {
    http_client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl PicwishClient {
    /// Create a new client with default configuration
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(ClientConfig::default(), credentials)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        Self::with_config_and_base_url(config, DEFAULT_BASE_URL, credentials)
    }

    /// Create a new client against an explicit base URL (self-hosted proxy, tests)
    pub fn with_config_and_base_url(
        config: ClientConfig,
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build full URL as `{base}{endpoint}`, keeping any path prefix on the base
    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{endpoint}"))?)
    }

    /// Endpoint URL with `resource` appended as a single percent-encoded path segment
    fn resource_url(&self, endpoint: &str, resource: &str) -> Result<Url> {
        let mut url = self.endpoint_url(endpoint)?;
        url.path_segments_mut()
            .map_err(|()| EnhancerError::InvalidInput("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(resource);
        Ok(url)
    }

    /// Build request builder with the API key and JSON accept headers
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.endpoint_url(endpoint)?;
        Ok(self.request_to(method, url))
    }

    /// Same as [`request`](Self::request) for one resource below `endpoint`
    pub(crate) fn resource_request(
        &self,
        method: Method,
        endpoint: &str,
        resource: &str,
    ) -> Result<RequestBuilder> {
        let url = self.resource_url(endpoint, resource)?;
        Ok(self.request_to(method, url))
    }

    fn request_to(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(API_KEY_HEADER, self.credentials.api_key())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    /// Send a request and decode a JSON body, classifying non-2xx statuses
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "request rejected by remote service");
            return Err(EnhancerError::from_response(status, &body, retry_after));
        }

        serde_json::from_str(&body).map_err(|err| {
            EnhancerError::InvalidResponse(format!("unexpected response body: {err}"))
        })
    }
}

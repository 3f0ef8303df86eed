//! HTTP transport seam for the statistics API
//!
//! The fetcher only needs "GET this URL with these query parameters and
//! give me the status and body". Keeping that behind a trait lets tests
//! script responses and count calls without a network.

use crate::error::{IngestError, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Boxed error returned by transports
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// A single GET request
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Value of the first query parameter called `name`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

// The credential travels as a query parameter and must never reach logs.
impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let query: Vec<(&str, &str)> = self
            .query
            .iter()
            .map(|(key, value)| {
                if key == crate::constants::api_fields::KEY_PARAM {
                    (key.as_str(), "<redacted>")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("ApiRequest")
            .field("url", &self.url)
            .field("query", &query)
            .finish()
    }
}

/// Status code and raw body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP GET
pub trait HttpTransport {
    fn get(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        (**self).get(request)
    }
}

/// `reqwest` blocking client with a per-request timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::Configuration {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        debug!("GET {}", request.url);

        // without_url keeps the query string, and with it the key, out of error messages
        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .send()
            .map_err(reqwest::Error::without_url)?;

        let status = response.status().as_u16();
        let body = response.text().map_err(reqwest::Error::without_url)?;
        Ok(ApiResponse { status, body })
    }
}

//! Registry transport boundary.
//!
//! One operation: issue a request (method, URI, optional JSON body) against
//! the registry API and hand back either a transport error or the HTTP
//! status plus raw body. Status interpretation is left to callers; this
//! layer never retries and never treats a non-2xx status as an error.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw registry response: status plus undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryResponse {
    pub status: u16,
    pub body: String,
}

impl RegistryResponse {
    /// Registry success range is 200–299 inclusive.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// No usable response was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connect, TLS, timeout, or other send failure.
    Send(String),
    /// The response arrived but its body could not be read.
    Body(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Send(msg) => write!(f, "transport error: {msg}"),
            TransportError::Body(msg) => write!(f, "transport error reading body: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// Registry API transport contract.
///
/// Object safe so a pass can hold `&dyn RegistryTransport`. Calls block
/// until a response or error is available.
pub trait RegistryTransport {
    fn request(
        &self,
        method: HttpMethod,
        uri: &str,
        body: Option<&Value>,
    ) -> Result<RegistryResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// Blocking HTTP implementation
// ---------------------------------------------------------------------------

/// reqwest-backed transport.
///
/// `uri` values are registry paths (`/v2/...`) joined onto `base_url`;
/// absolute URLs are used as-is. The bearer token is never logged.
pub struct HttpRegistryTransport {
    http: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl fmt::Debug for HttpRegistryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRegistryTransport")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

impl HttpRegistryTransport {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build registry http client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, uri: &str) -> String {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return uri.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            uri.trim_start_matches('/')
        )
    }
}

impl RegistryTransport for HttpRegistryTransport {
    fn request(
        &self,
        method: HttpMethod,
        uri: &str,
        body: Option<&Value>,
    ) -> Result<RegistryResponse, TransportError> {
        let url = self.url_for(uri);
        let mut req = match method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
            HttpMethod::Put => self.http.put(&url),
        };
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .map_err(|e| TransportError::Send(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(RegistryResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

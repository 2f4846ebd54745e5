// crates/fixture-lease-http/src/endpoint.rs
// ============================================================================
// Module: Fixture Lease HTTP Endpoint
// Description: Shared blocking client, URL joining, and response handling.
// Purpose: Keep transport policy identical across every collaborator.
// Dependencies: fixture-lease-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`Endpoint`] pairs a backend base URL with a blocking client.
//! Invariants:
//! - Base URLs use `http` or `https`.
//! - Redirects are rejected.
//! - Non-success statuses surface as [`UpstreamError::Status`].
//! - Response bodies are capped at [`MAX_RESPONSE_BYTES`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use fixture_lease_core::UpstreamError;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde_json::Value;
use url::Url;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum response body size accepted from the backend.
pub const MAX_RESPONSE_BYTES: u64 = 4 * 1024 * 1024;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("fixture-lease/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Backend base URL plus the client used to reach it.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Base URL without a trailing slash requirement.
    base_url: Url,
    /// Blocking HTTP client.
    client: Client,
}

impl Endpoint {
    /// Builds an endpoint with a client using the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Transport`] when the URL is invalid or the
    /// client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        Self::with_client(base_url, client)
    }

    /// Builds an endpoint around a preconfigured client.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Transport`] when the URL is invalid.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| UpstreamError::Transport(format!("invalid base url: {err}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(UpstreamError::Transport(format!(
                "unsupported base url scheme: {}",
                base_url.scheme()
            )));
        }
        Ok(Self {
            base_url,
            client,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the base URL with `path` appended.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Transport`] when `path` does not start with
    /// `/` or carries a query.
    pub fn url(&self, path: &str) -> Result<Url, UpstreamError> {
        if !path.starts_with('/') || path.contains(['?', '#']) {
            return Err(UpstreamError::Transport(format!("invalid api path: {path}")));
        }
        let mut url = self.base_url.clone();
        let joined = format!("{}{path}", self.base_url.path().trim_end_matches('/'));
        url.set_path(&joined);
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    /// Returns the HTTP client.
    pub(crate) const fn client(&self) -> &Client {
        &self.client
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Sends a request and fails on any non-success status.
pub(crate) fn send(request: RequestBuilder, operation: &str) -> Result<Response, UpstreamError> {
    let response = request
        .send()
        .map_err(|err| UpstreamError::Transport(format!("{operation}: {err}")))?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            operation: operation.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Reads a JSON body; an empty body reads as `null`.
pub(crate) fn read_json(response: Response, operation: &str) -> Result<Value, UpstreamError> {
    if let Some(length) = response.content_length()
        && length > MAX_RESPONSE_BYTES
    {
        return Err(UpstreamError::Decode(format!(
            "{operation}: response of {length} bytes exceeds limit"
        )));
    }
    let mut bytes = Vec::new();
    response
        .take(MAX_RESPONSE_BYTES.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|err| UpstreamError::Transport(format!("{operation}: {err}")))?;
    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > MAX_RESPONSE_BYTES {
        return Err(UpstreamError::Decode(format!("{operation}: response exceeds limit")));
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes)
        .map_err(|err| UpstreamError::Decode(format!("{operation}: {err}")))
}

/// Serializes a JSON request body.
pub(crate) fn json_body<T: serde::Serialize>(
    value: &T,
    operation: &str,
) -> Result<Vec<u8>, UpstreamError> {
    serde_json::to_vec(value).map_err(|err| UpstreamError::Decode(format!("{operation}: {err}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

// crates/fixture-lease-http/src/login.rs
// ============================================================================
// Module: Fixture Lease API Login
// Description: Backend login delegate producing bearer tokens.
// Purpose: Authenticate identities over the API instead of the browser.
// Dependencies: fixture-lease-core, reqwest, serde
// ============================================================================

//! ## Overview
//! [`ApiLogin`] posts `{email, password}` to the login path and reads the
//! `token` field of the response. It implements [`Authenticator`], so it can
//! back an [`fixture_lease_core::AuthStateCache`] directly and mint tokens
//! for owner-scoped clients.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use fixture_lease_core::Authenticator;
use fixture_lease_core::Identity;
use fixture_lease_core::UpstreamError;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::endpoint::json_body;
use crate::endpoint::read_json;
use crate::endpoint::send;

// ============================================================================
// SECTION: Bearer Token
// ============================================================================

/// API bearer token returned by a login.
///
/// # Invariants
/// - Never empty.
/// - Never rendered by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Rejected`] when the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, UpstreamError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(UpstreamError::Rejected("bearer token is empty".to_string()));
        }
        Ok(Self(token))
    }

    /// Returns the raw token for request headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

// ============================================================================
// SECTION: Login
// ============================================================================

/// Operation label for login requests.
const LOGIN_OPERATION: &str = "login";

/// Login request body.
#[derive(Serialize)]
struct LoginRequest<'a> {
    /// Login email.
    email: &'a str,
    /// Login password.
    password: &'a str,
}

/// Login delegate backed by the backend's login endpoint.
#[derive(Debug, Clone)]
pub struct ApiLogin {
    /// Backend endpoint.
    endpoint: Endpoint,
    /// Login path relative to the base URL.
    login_path: String,
}

impl ApiLogin {
    /// Creates a login delegate.
    #[must_use]
    pub fn new(endpoint: Endpoint, login_path: impl Into<String>) -> Self {
        Self {
            endpoint,
            login_path: login_path.into(),
        }
    }

    /// Returns the backend endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Authenticator for ApiLogin {
    type State = BearerToken;

    fn authenticate(&self, identity: &Identity) -> Result<BearerToken, UpstreamError> {
        let url = self.endpoint.url(&self.login_path)?;
        let body = json_body(
            &LoginRequest {
                email: identity.email(),
                password: identity.password(),
            },
            LOGIN_OPERATION,
        )?;
        let request =
            self.endpoint.client().post(url).header(CONTENT_TYPE, "application/json").body(body);
        let response = read_json(send(request, LOGIN_OPERATION)?, LOGIN_OPERATION)?;
        let token = response.get("token").and_then(Value::as_str).ok_or_else(|| {
            UpstreamError::Rejected(format!("login for {} returned no token", identity.id()))
        })?;
        BearerToken::new(token)
    }
}

// crates/fixture-lease-http/src/client.rs
// ============================================================================
// Module: Fixture Lease API Client
// Description: Bearer-authenticated data-access client for the item collection.
// Purpose: Count and create seed records through the backend API.
// Dependencies: fixture-lease-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! [`ApiClient`] counts with `GET {collection}?created_by=..&limit=1` and
//! reads `pagination.total`; it creates with `POST {collection}`.
//! [`ApiClientProvider`] logs in as an owner and hands out a client that acts
//! on that owner's behalf.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use fixture_lease_core::Authenticator;
use fixture_lease_core::DataAccessClient;
use fixture_lease_core::Identity;
use fixture_lease_core::ItemFilter;
use fixture_lease_core::OwnerClientProvider;
use fixture_lease_core::UpstreamError;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::endpoint::json_body;
use crate::endpoint::read_json;
use crate::endpoint::send;
use crate::login::ApiLogin;
use crate::login::BearerToken;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Operation label for count requests.
const COUNT_OPERATION: &str = "count items";
/// Operation label for create requests.
const CREATE_OPERATION: &str = "create item";

// ============================================================================
// SECTION: API Client
// ============================================================================

/// Data-access client authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Backend endpoint.
    endpoint: Endpoint,
    /// Collection path relative to the base URL.
    collection: String,
    /// Token sent as `Authorization: Bearer`.
    token: BearerToken,
}

impl ApiClient {
    /// Creates a client for a collection.
    #[must_use]
    pub fn new(endpoint: Endpoint, collection: impl Into<String>, token: BearerToken) -> Self {
        Self {
            endpoint,
            collection: collection.into(),
            token,
        }
    }

    /// Returns the collection path.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl DataAccessClient for ApiClient {
    fn count(&self, filter: &ItemFilter) -> Result<u64, UpstreamError> {
        let mut url = self.endpoint.url(&self.collection)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(owner) = &filter.created_by {
                query.append_pair("created_by", owner.as_str());
            }
            query.append_pair("limit", "1");
        }
        let request = self.endpoint.client().get(url).bearer_auth(self.token.expose());
        let body = read_json(send(request, COUNT_OPERATION)?, COUNT_OPERATION)?;
        body.pointer("/pagination/total").and_then(Value::as_u64).ok_or_else(|| {
            UpstreamError::Decode(format!("{COUNT_OPERATION}: missing pagination.total"))
        })
    }

    fn create(&self, payload: &Value) -> Result<Value, UpstreamError> {
        let url = self.endpoint.url(&self.collection)?;
        let body = json_body(payload, CREATE_OPERATION)?;
        let request = self
            .endpoint
            .client()
            .post(url)
            .bearer_auth(self.token.expose())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        read_json(send(request, CREATE_OPERATION)?, CREATE_OPERATION)
    }
}

// ============================================================================
// SECTION: Owner Clients
// ============================================================================

/// Builds owner-authenticated clients by logging in through the API.
#[derive(Debug, Clone)]
pub struct ApiClientProvider {
    /// Login delegate used for owners.
    login: ApiLogin,
    /// Collection path relative to the base URL.
    collection: String,
}

impl ApiClientProvider {
    /// Creates a provider sharing the login delegate's endpoint.
    #[must_use]
    pub fn new(login: ApiLogin, collection: impl Into<String>) -> Self {
        Self {
            login,
            collection: collection.into(),
        }
    }
}

impl OwnerClientProvider for ApiClientProvider {
    fn client_for(&self, owner: &Identity) -> Result<Arc<dyn DataAccessClient>, UpstreamError> {
        let token = self.login.authenticate(owner)?;
        Ok(Arc::new(ApiClient::new(
            self.login.endpoint().clone(),
            self.collection.clone(),
            token,
        )))
    }
}

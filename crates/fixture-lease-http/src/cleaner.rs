// crates/fixture-lease-http/src/cleaner.rs
// ============================================================================
// Module: Fixture Lease HTTP Cleaner
// Description: Seed cleanup through a test-support delete endpoint.
// Purpose: Hard-delete seed-tagged records when reset is enabled.
// Dependencies: fixture-lease-core, reqwest
// ============================================================================

//! ## Overview
//! [`HttpSeedCleaner`] issues `DELETE {cleanup_path}?tag=seed` for the global
//! scope and adds `created_by` for an owner scope. The backend is expected to
//! delete only records carrying the tag.

// ============================================================================
// SECTION: Imports
// ============================================================================

use fixture_lease_core::IdentityId;
use fixture_lease_core::SEED_TAG;
use fixture_lease_core::SeedCleaner;
use fixture_lease_core::UpstreamError;

use crate::endpoint::Endpoint;
use crate::endpoint::send;
use crate::login::BearerToken;

/// Operation label for cleanup requests.
const DELETE_OPERATION: &str = "delete seed records";

/// Seed cleaner backed by an authenticated delete endpoint.
#[derive(Debug, Clone)]
pub struct HttpSeedCleaner {
    /// Backend endpoint.
    endpoint: Endpoint,
    /// Cleanup path relative to the base URL.
    cleanup_path: String,
    /// Admin token sent with delete requests.
    token: BearerToken,
}

impl HttpSeedCleaner {
    /// Creates a cleaner.
    #[must_use]
    pub fn new(endpoint: Endpoint, cleanup_path: impl Into<String>, token: BearerToken) -> Self {
        Self {
            endpoint,
            cleanup_path: cleanup_path.into(),
            token,
        }
    }

    /// Sends the delete request with an optional owner filter.
    fn delete(&self, owner: Option<&IdentityId>) -> Result<(), UpstreamError> {
        let mut url = self.endpoint.url(&self.cleanup_path)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("tag", SEED_TAG);
            if let Some(owner) = owner {
                query.append_pair("created_by", owner.as_str());
            }
        }
        let request = self.endpoint.client().delete(url).bearer_auth(self.token.expose());
        send(request, DELETE_OPERATION).map(drop)
    }
}

impl SeedCleaner for HttpSeedCleaner {
    fn delete_all_seed_records(&self) -> Result<(), UpstreamError> {
        self.delete(None)
    }

    fn delete_seed_records_for_owner(&self, owner: &IdentityId) -> Result<(), UpstreamError> {
        self.delete(Some(owner))
    }
}

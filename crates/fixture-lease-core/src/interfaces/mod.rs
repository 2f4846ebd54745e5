// crates/fixture-lease-core/src/interfaces/mod.rs
// ============================================================================
// Module: Fixture Lease Interfaces
// Description: Collaborator contracts for login, data access, cleanup, payloads.
// Purpose: Keep the runtime independent of HTTP, browser, and database clients.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Interfaces define how the fixture runtime reaches the systems under test
//! without embedding transport details. Implementations must surface every
//! failure as an [`UpstreamError`]; the runtime never retries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::core::Identity;
use crate::core::IdentityId;
use crate::core::ItemFilter;
use crate::core::UpstreamError;

// ============================================================================
// SECTION: Authentication
// ============================================================================

/// Login strategy that turns an identity into an authenticated state.
///
/// UI strategies return browser storage state; API strategies return bearer
/// tokens. Both satisfy the same contract.
pub trait Authenticator: Send + Sync {
    /// Opaque authenticated state produced by a login.
    type State: Clone + Send + Sync;

    /// Performs a real login for the identity.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the login fails.
    fn authenticate(&self, identity: &Identity) -> Result<Self::State, UpstreamError>;
}

/// Login handler signature used by [`FnAuthenticator`].
type LoginHandler<S> = dyn Fn(&Identity) -> Result<S, UpstreamError> + Send + Sync;

/// Authenticator backed by a plain function or closure.
pub struct FnAuthenticator<S> {
    /// Handler invoked for each login.
    handler: Arc<LoginHandler<S>>,
}

impl<S> FnAuthenticator<S> {
    /// Creates an authenticator from a login function.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Identity) -> Result<S, UpstreamError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl<S> Clone for FnAuthenticator<S> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<S> Authenticator for FnAuthenticator<S>
where
    S: Clone + Send + Sync,
{
    type State = S;

    fn authenticate(&self, identity: &Identity) -> Result<S, UpstreamError> {
        (self.handler)(identity)
    }
}

// ============================================================================
// SECTION: Data Access
// ============================================================================

/// Backend client used to check for and create seed records.
pub trait DataAccessClient: Send + Sync {
    /// Returns the total number of records matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] on non-success responses or malformed bodies.
    fn count(&self, filter: &ItemFilter) -> Result<u64, UpstreamError>;

    /// Creates one record and returns the created resource.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the record is not created.
    fn create(&self, payload: &Value) -> Result<Value, UpstreamError>;
}

/// Supplies data-access clients authenticated as a specific owner.
pub trait OwnerClientProvider: Send + Sync {
    /// Logs in as the owner and returns a client acting on their behalf.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the owner cannot be authenticated.
    fn client_for(&self, owner: &Identity) -> Result<Arc<dyn DataAccessClient>, UpstreamError>;
}

// ============================================================================
// SECTION: Cleanup
// ============================================================================

/// Destructive cleanup used only when seed reset is enabled.
///
/// # Invariants
/// - Only records tagged with [`crate::core::SEED_TAG`] are deleted.
pub trait SeedCleaner: Send + Sync {
    /// Hard-deletes every seed-tagged record.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the delete fails.
    fn delete_all_seed_records(&self) -> Result<(), UpstreamError>;

    /// Hard-deletes seed-tagged records created by one owner.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the delete fails.
    fn delete_seed_records_for_owner(&self, owner: &IdentityId) -> Result<(), UpstreamError>;
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Builds the ordered payload set submitted when a scope lacks data.
///
/// Builders perform no I/O. Payload shapes are deterministic even when
/// individual field values are randomized.
pub trait PayloadBuilder: Send + Sync {
    /// Builds payloads, attributing them to `owner` when scoped.
    fn build(&self, owner: Option<&IdentityId>) -> Vec<Value>;

    /// Returns the number of payloads every batch holds, when fixed.
    ///
    /// The orchestrator builder rejects fixed batches smaller than the
    /// largest threshold. Builders returning `None` are checked per batch.
    fn batch_size(&self) -> Option<u64> {
        None
    }
}

// crates/fixture-lease-core/src/core/error.rs
// ============================================================================
// Module: Fixture Lease Errors
// Description: Error taxonomy for leasing, auth caching, and seeding.
// Purpose: Surface every failure to the calling test without local recovery.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`FixtureError`] is returned by every runtime operation. Collaborator
//! failures (data access, cleanup, login) are wrapped unchanged in
//! [`UpstreamError`]; nothing in this crate retries or suppresses them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identity::Role;

// ============================================================================
// SECTION: Upstream Errors
// ============================================================================

/// Failures reported by external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Collaborator answered with a non-success status.
    #[error("{operation} failed with http status {status}")]
    Status {
        /// Operation label (for example `count items`).
        operation: String,
        /// HTTP status code.
        status: u16,
    },
    /// Request could not be sent or the response could not be read.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Response body did not match the expected contract.
    #[error("decode failure: {0}")]
    Decode(String),
    /// Collaborator refused the request without a transport-level error.
    #[error("rejected: {0}")]
    Rejected(String),
}

// ============================================================================
// SECTION: Fixture Errors
// ============================================================================

/// Errors returned by pool, cache, and seed operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    /// Every identity for the role is currently leased.
    #[error("no available identities for role {role}")]
    PoolExhausted {
        /// Role that was requested.
        role: Role,
    },
    /// Cache read before the identity was logged in.
    #[error("no authentication state cached for {key}")]
    NotCached {
        /// Identity key that was requested.
        key: String,
    },
    /// Role label does not name a supported role.
    #[error("unsupported role: {0}")]
    UnsupportedRole(String),
    /// Identity key is already bound to a different identity.
    #[error("identity conflict: {0}")]
    IdentityConflict(String),
    /// Pool definition is inconsistent.
    #[error("invalid identity pool: {0}")]
    InvalidPool(String),
    /// Components were wired inconsistently.
    #[error("misconfigured fixtures: {0}")]
    Misconfigured(String),
    /// External collaborator failed.
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamError),
}

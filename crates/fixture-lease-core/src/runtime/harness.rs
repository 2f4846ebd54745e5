// crates/fixture-lease-core/src/runtime/harness.rs
// ============================================================================
// Module: Fixture Lease Harness
// Description: Per-test composition of leasing, auth caching, and seeding.
// Purpose: Run the lease → login → seed → test → release control flow.
// Dependencies: crate::runtime, crate::interfaces
// ============================================================================

//! ## Overview
//! [`FixtureHarness`] owns the session-scoped pool, cache, and orchestrator and
//! is passed by reference to every test. [`FixtureHarness::prepare`] returns a
//! [`PreparedFixture`] that holds the lease; dropping it releases the identity,
//! so the release happens on every exit path including a failed seed step or
//! a panicking test body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::FixtureError;
use crate::core::Identity;
use crate::core::Role;
use crate::interfaces::Authenticator;
use crate::runtime::auth_cache::AuthStateCache;
use crate::runtime::pool::IdentityPool;
use crate::runtime::pool::Lease;
use crate::runtime::seed::SeedOrchestrator;
use crate::runtime::seed::SeedReport;

// ============================================================================
// SECTION: Prepared Fixture
// ============================================================================

/// Leased, authenticated, and seeded context for one test.
pub struct PreparedFixture<'a, S> {
    /// Lease released when the fixture drops.
    lease: Lease<'a>,
    /// Authenticated state for the leased identity.
    auth_state: S,
    /// Seeding performed before the test.
    seed: SeedReport,
}

impl<S> PreparedFixture<'_, S> {
    /// Returns the leased identity.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        self.lease.identity()
    }

    /// Returns the role the fixture was prepared for.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.lease.role()
    }

    /// Returns the authenticated state.
    #[must_use]
    pub const fn auth_state(&self) -> &S {
        &self.auth_state
    }

    /// Returns the seed report.
    #[must_use]
    pub const fn seed(&self) -> &SeedReport {
        &self.seed
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Session-scoped fixture context shared by every test.
pub struct FixtureHarness<A: Authenticator> {
    /// Identity pool.
    pool: IdentityPool,
    /// Authentication state cache.
    auth: AuthStateCache<A>,
    /// Seed orchestrator.
    seeds: SeedOrchestrator,
}

impl<A: Authenticator> FixtureHarness<A> {
    /// Creates a harness from its components.
    #[must_use]
    pub const fn new(pool: IdentityPool, auth: AuthStateCache<A>, seeds: SeedOrchestrator) -> Self {
        Self {
            pool,
            auth,
            seeds,
        }
    }

    /// Returns the identity pool.
    #[must_use]
    pub const fn pool(&self) -> &IdentityPool {
        &self.pool
    }

    /// Returns the authentication cache.
    #[must_use]
    pub const fn auth(&self) -> &AuthStateCache<A> {
        &self.auth
    }

    /// Returns the seed orchestrator.
    #[must_use]
    pub const fn seeds(&self) -> &SeedOrchestrator {
        &self.seeds
    }

    /// Leases an identity, resolves its auth state, and seeds its scopes.
    ///
    /// # Errors
    ///
    /// Returns the first failure of leasing, login, or seeding. The lease is
    /// released before the error is returned.
    pub fn prepare(&self, role: Role) -> Result<PreparedFixture<'_, A::State>, FixtureError> {
        let lease = self.pool.lease(role)?;
        let auth_state = self.auth.resolve(lease.identity())?;
        let seed = self.seeds.ensure(role, lease.identity())?;
        Ok(PreparedFixture {
            lease,
            auth_state,
            seed,
        })
    }

    /// Prepares a fixture for the role selected by test markers.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::prepare`].
    pub fn prepare_for_markers<I, S>(
        &self,
        markers: I,
    ) -> Result<PreparedFixture<'_, A::State>, FixtureError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.prepare(Role::from_markers(markers))
    }

    /// Runs a test body with a prepared fixture and releases the lease after.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::prepare`]; the body's own result is
    /// returned unchanged inside `Ok`.
    pub fn run<T, F>(&self, role: Role, body: F) -> Result<T, FixtureError>
    where
        F: FnOnce(&PreparedFixture<'_, A::State>) -> T,
    {
        let fixture = self.prepare(role)?;
        Ok(body(&fixture))
    }
}

// crates/fixture-lease-http/src/wiring.rs
// ============================================================================
// Module: Fixture Lease HTTP Wiring
// Description: Builds HTTP-backed orchestrators and harnesses from config.
// Purpose: Give suites and the CLI one place that assembles collaborators.
// Dependencies: fixture-lease-config, fixture-lease-core
// ============================================================================

//! ## Overview
//! The seed orchestrator logs in as the configured admin once, at
//! construction, and reuses that token for global counts, creates, and
//! cleanup. Owner-scoped clients log in as the owner on first use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use fixture_lease_config::FixtureLeaseConfig;
use fixture_lease_core::AuthStateCache;
use fixture_lease_core::Authenticator;
use fixture_lease_core::CatalogItemBuilder;
use fixture_lease_core::FixtureAuditSink;
use fixture_lease_core::FixtureError;
use fixture_lease_core::FixtureHarness;
use fixture_lease_core::Identity;
use fixture_lease_core::IdentityPool;
use fixture_lease_core::Role;
use fixture_lease_core::SeedOrchestrator;
use fixture_lease_core::UpstreamError;

use crate::cleaner::HttpSeedCleaner;
use crate::client::ApiClient;
use crate::client::ApiClientProvider;
use crate::endpoint::Endpoint;
use crate::login::ApiLogin;

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Builds the backend endpoint described by the configuration.
///
/// # Errors
///
/// Returns [`UpstreamError::Transport`] when the client cannot be built.
pub fn endpoint_from_config(config: &FixtureLeaseConfig) -> Result<Endpoint, UpstreamError> {
    Endpoint::new(&config.backend.base_url, config.backend.timeout())
}

/// Builds a seed orchestrator that talks to the configured backend.
///
/// # Errors
///
/// Returns [`FixtureError::Misconfigured`] when `admin` is not an ADMIN
/// identity, and [`FixtureError::Upstream`] when the admin login fails.
pub fn seed_orchestrator(
    config: &FixtureLeaseConfig,
    admin: &Identity,
    audit: Arc<dyn FixtureAuditSink>,
) -> Result<SeedOrchestrator, FixtureError> {
    if admin.role() != Role::Admin {
        return Err(FixtureError::Misconfigured(format!(
            "seed admin {} has role {}",
            admin.id(),
            admin.role()
        )));
    }
    let endpoint = endpoint_from_config(config)?;
    let login = ApiLogin::new(endpoint.clone(), config.backend.login_path.as_str());
    let token = login.authenticate(admin)?;
    let payloads = CatalogItemBuilder::new(config.seed.payload_count)
        .with_batch_tag(config.seed.batch_tag.as_str());

    let mut builder = SeedOrchestrator::builder()
        .admin_client(Arc::new(ApiClient::new(
            endpoint.clone(),
            config.seed.collection.as_str(),
            token.clone(),
        )))
        .owner_clients(Arc::new(ApiClientProvider::new(login, config.seed.collection.as_str())))
        .payload_builder(Arc::new(payloads))
        .thresholds(config.thresholds())
        .reset(config.seed.reset)
        .audit(audit);
    if config.seed.reset {
        builder = builder.cleaner(Arc::new(HttpSeedCleaner::new(
            endpoint,
            config.seed.cleanup_path.as_str(),
            token,
        )));
    }
    builder.build()
}

/// Builds a harness whose auth cache holds API bearer tokens.
///
/// # Errors
///
/// Returns the errors of [`IdentityPool::with_audit`], then
/// [`FixtureError::Misconfigured`] when the configured admin is not among
/// `identities`, and the errors of [`seed_orchestrator`]. The pool is
/// validated before any login is attempted.
pub fn api_harness(
    config: &FixtureLeaseConfig,
    identities: Vec<Identity>,
    audit: &Arc<dyn FixtureAuditSink>,
) -> Result<FixtureHarness<ApiLogin>, FixtureError> {
    let pool = IdentityPool::with_audit(identities, Arc::clone(audit))?;
    let admin = resolve_admin(config, pool.identities(Role::Admin))?;
    let seeds = seed_orchestrator(config, admin, Arc::clone(audit))?;
    let login = ApiLogin::new(endpoint_from_config(config)?, config.backend.login_path.as_str());
    let auth = AuthStateCache::with_audit(login, Arc::clone(audit));
    Ok(FixtureHarness::new(pool, auth, seeds))
}

/// Finds the identity the configuration names as the seeding admin.
///
/// # Errors
///
/// Returns [`FixtureError::Misconfigured`] when no ADMIN identity is
/// configured or the configured one is missing from `identities`.
pub fn resolve_admin<'a>(
    config: &FixtureLeaseConfig,
    identities: &'a [Identity],
) -> Result<&'a Identity, FixtureError> {
    let admin = config.admin_identity().ok_or_else(|| {
        FixtureError::Misconfigured("no ADMIN identity is configured".to_string())
    })?;
    identities
        .iter()
        .find(|identity| identity.role() == Role::Admin && identity.id().as_str() == admin.id)
        .ok_or_else(|| {
            FixtureError::Misconfigured(format!("admin identity {} was not resolved", admin.id))
        })
}

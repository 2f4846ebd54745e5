// crates/fixture-lease-core/tests/harness.rs
// ============================================================================
// Module: Fixture Harness Tests
// Description: End-to-end lease, login, seed, and release flow.
// Purpose: Validate guaranteed release on every exit path.
// Dependencies: fixture-lease-core
// ============================================================================
//! ## Overview
//! Runs the full per-test control flow against in-memory collaborators.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::FixedPayloads;
use common::PerOwnerBackends;
use common::counting_authenticator;
use common::failing_authenticator;
use common::standard_identities;
use fixture_lease_core::AuthStateCache;
use fixture_lease_core::FixtureError;
use fixture_lease_core::FixtureHarness;
use fixture_lease_core::FnAuthenticator;
use fixture_lease_core::IdentityPool;
use fixture_lease_core::InMemoryBackend;
use fixture_lease_core::Role;
use fixture_lease_core::SeedOrchestrator;

fn seeds(admin: &InMemoryBackend) -> SeedOrchestrator {
    SeedOrchestrator::builder()
        .admin_client(Arc::new(admin.clone()))
        .owner_clients(Arc::new(PerOwnerBackends::default()))
        .payload_builder(Arc::new(FixedPayloads {
            count: 31,
        }))
        .build()
        .unwrap()
}

fn harness(
    authenticator: FnAuthenticator<String>,
    admin: &InMemoryBackend,
) -> FixtureHarness<FnAuthenticator<String>> {
    FixtureHarness::new(
        IdentityPool::new(standard_identities()).unwrap(),
        AuthStateCache::new(authenticator),
        seeds(admin),
    )
}

#[test]
fn prepare_leases_logs_in_and_seeds() {
    let (authenticator, calls) = counting_authenticator();
    let admin = InMemoryBackend::new();
    let harness = harness(authenticator, &admin);

    let fixture = harness.prepare(Role::Editor).unwrap();

    assert_eq!(fixture.identity().id().as_str(), "e1");
    assert_eq!(fixture.role(), Role::Editor);
    assert_eq!(fixture.auth_state(), "token-e1");
    assert_eq!(fixture.seed().scopes.len(), 2);
    assert!(harness.pool().is_leased(fixture.identity()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    drop(fixture);
    assert_eq!(harness.pool().leased_count(Role::Editor), 0);
}

#[test]
fn second_test_on_same_identity_reuses_login() {
    let (authenticator, calls) = counting_authenticator();
    let admin = InMemoryBackend::with_records(31, None);
    let harness = harness(authenticator, &admin);

    let first = harness.run(Role::Admin, |fixture| fixture.identity().clone()).unwrap();
    let second = harness.run(Role::Admin, |fixture| fixture.identity().clone()).unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(harness.auth().exists(&first));
    assert_eq!(admin.calls().count, 1);
}

#[test]
fn concurrent_fixtures_use_distinct_identities() {
    let (authenticator, _calls) = counting_authenticator();
    let admin = InMemoryBackend::with_records(31, None);
    let harness = harness(authenticator, &admin);

    let first = harness.prepare(Role::Admin).unwrap();
    let second = harness.prepare(Role::Admin).unwrap();
    let third = harness.prepare(Role::Admin);

    assert_ne!(first.identity(), second.identity());
    assert!(matches!(third, Err(FixtureError::PoolExhausted { .. })));
}

#[test]
fn login_failure_releases_lease() {
    let admin = InMemoryBackend::new();
    let harness = harness(failing_authenticator(), &admin);

    let result = harness.prepare(Role::Viewer);

    assert!(matches!(result, Err(FixtureError::Upstream(_))));
    assert_eq!(harness.pool().leased_count(Role::Viewer), 0);
    assert!(admin.operations().is_empty());
}

#[test]
fn seeding_failure_releases_lease() {
    let (authenticator, _calls) = counting_authenticator();
    let admin = InMemoryBackend::new();
    admin.set_create_failure(Some(503));
    let harness = harness(authenticator, &admin);

    let result = harness.prepare(Role::Viewer);

    assert!(matches!(result, Err(FixtureError::Upstream(_))));
    assert_eq!(harness.pool().leased_count(Role::Viewer), 0);
}

#[test]
fn panicking_test_body_releases_lease() {
    let (authenticator, _calls) = counting_authenticator();
    let admin = InMemoryBackend::with_records(31, None);
    let harness = harness(authenticator, &admin);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        harness
            .run(Role::Viewer, |fixture| {
                assert_eq!(fixture.role(), Role::Admin, "page assertion failed");
            })
            .unwrap();
    }));

    assert!(outcome.is_err());
    assert_eq!(harness.pool().leased_count(Role::Viewer), 0);
}

#[test]
fn markers_select_role() {
    let (authenticator, _calls) = counting_authenticator();
    let admin = InMemoryBackend::with_records(31, None);
    let harness = harness(authenticator, &admin);

    let viewer = harness.prepare_for_markers(["smoke", "viewer"]).unwrap();
    assert_eq!(viewer.role(), Role::Viewer);
    drop(viewer);

    let default = harness.prepare_for_markers(Vec::<String>::new()).unwrap();
    assert_eq!(default.role(), Role::Admin);
}

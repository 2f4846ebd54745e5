// crates/fixture-lease-core/src/lib.rs
// ============================================================================
// Module: Fixture Lease Core Library
// Description: Public API surface for the Fixture Lease core.
// Purpose: Expose identities, collaborator interfaces, and runtime fixtures.
// Dependencies: crate::{audit, builders, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Fixture Lease coordinates end-to-end test fixtures: it leases role-scoped
//! identities to parallel tests, memoizes login state per identity, and makes
//! sure baseline data exists in the backend before a test runs. Transport
//! details stay behind the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod builders;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use audit::FileAuditSink;
pub use audit::FixtureAuditEvent;
pub use audit::FixtureAuditSink;
pub use audit::FixtureEventKind;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use builders::CatalogItemBuilder;
pub use interfaces::Authenticator;
pub use interfaces::DataAccessClient;
pub use interfaces::FnAuthenticator;
pub use interfaces::OwnerClientProvider;
pub use interfaces::PayloadBuilder;
pub use interfaces::SeedCleaner;
pub use runtime::AuthStateCache;
pub use runtime::BackendCalls;
pub use runtime::BackendOp;
pub use runtime::FixtureHarness;
pub use runtime::IdentityPool;
pub use runtime::InMemoryBackend;
pub use runtime::Lease;
pub use runtime::PreparedFixture;
pub use runtime::ScopeReport;
pub use runtime::SeedOrchestrator;
pub use runtime::SeedOrchestratorBuilder;
pub use runtime::SeedOutcome;
pub use runtime::SeedReport;

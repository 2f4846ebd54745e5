// crates/fixture-lease-core/src/runtime/mod.rs
// ============================================================================
// Module: Fixture Lease Runtime
// Description: Identity pool, auth cache, seed orchestrator, and harness.
// Purpose: Coordinate per-test fixtures across parallel workers.
// Dependencies: crate::core, crate::interfaces, crate::audit
// ============================================================================

//! ## Overview
//! Runtime components are explicit session-scoped values. They are built once
//! and passed by reference to each test; nothing here is a global singleton.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth_cache;
pub mod harness;
pub mod memory;
pub mod pool;
pub mod seed;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth_cache::AuthStateCache;
pub use harness::FixtureHarness;
pub use harness::PreparedFixture;
pub use memory::BackendCalls;
pub use memory::BackendOp;
pub use memory::InMemoryBackend;
pub use pool::IdentityPool;
pub use pool::Lease;
pub use seed::ScopeReport;
pub use seed::SeedOrchestrator;
pub use seed::SeedOrchestratorBuilder;
pub use seed::SeedOutcome;
pub use seed::SeedReport;

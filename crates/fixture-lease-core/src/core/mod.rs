// crates/fixture-lease-core/src/core/mod.rs
// ============================================================================
// Module: Fixture Lease Core Types
// Description: Identities, roles, seed scopes, and the error taxonomy.
// Purpose: Group the domain types shared by interfaces and runtime.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types carry no behavior beyond validation and formatting; all
//! coordination lives in [`crate::runtime`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod identity;
pub mod seed;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::FixtureError;
pub use error::UpstreamError;
pub use identity::Identity;
pub use identity::IdentityId;
pub use identity::Role;
pub use seed::DEFAULT_GLOBAL_REQUIRED;
pub use seed::DEFAULT_OWNER_REQUIRED;
pub use seed::ItemFilter;
pub use seed::SEED_TAG;
pub use seed::ScopeKind;
pub use seed::SeedScope;
pub use seed::SeedThresholds;
pub use seed::seed_plan;

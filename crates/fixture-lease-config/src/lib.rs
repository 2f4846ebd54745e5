// crates/fixture-lease-config/src/lib.rs
// ============================================================================
// Module: Fixture Lease Config Library
// Description: Canonical config model, validation, and environment overrides.
// Purpose: Single source of truth for fixture-lease.toml semantics.
// Dependencies: fixture-lease-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `fixture-lease-config` loads the suite configuration once at process start:
//! backend location, identity pool, seed thresholds, the reset flag, and the
//! audit sink. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use env::FixtureLeaseEnv;
pub use examples::config_toml_example;

// crates/fixture-lease-http/src/lib.rs
// ============================================================================
// Module: Fixture Lease HTTP Library
// Description: Blocking reqwest implementations of the fixture collaborators.
// Purpose: Reach the backend API for counting, creating, login, and cleanup.
// Dependencies: fixture-lease-core, fixture-lease-config, reqwest, url
// ============================================================================

//! ## Overview
//! Every collaborator here treats a non-success status as an error and never
//! retries. Requests go through a shared [`Endpoint`] that rejects redirects
//! and caps response bodies.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cleaner;
pub mod client;
pub mod endpoint;
pub mod login;
pub mod wiring;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cleaner::HttpSeedCleaner;
pub use client::ApiClient;
pub use client::ApiClientProvider;
pub use endpoint::Endpoint;
pub use endpoint::MAX_RESPONSE_BYTES;
pub use login::ApiLogin;
pub use login::BearerToken;
pub use wiring::api_harness;
pub use wiring::endpoint_from_config;
pub use wiring::resolve_admin;
pub use wiring::seed_orchestrator;

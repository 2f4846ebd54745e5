// crates/fixture-lease-core/src/core/seed.rs
// ============================================================================
// Module: Fixture Lease Seed Scopes
// Description: Seed scopes, thresholds, and the per-role seed plan table.
// Purpose: Describe where baseline data must exist before a test runs.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`SeedScope`] is the granularity at which "enough data exists" is
//! evaluated: globally, or for the records owned by one identity. The
//! [`seed_plan`] table maps each [`Role`] to the scopes that must be satisfied
//! before a test for that role runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::core::identity::Identity;
use crate::core::identity::IdentityId;
use crate::core::identity::Role;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tag carried by every seed record; cleanup only ever deletes tagged records.
pub const SEED_TAG: &str = "seed";

/// Default record count required in the global scope.
pub const DEFAULT_GLOBAL_REQUIRED: u64 = 31;

/// Default record count required per owner.
pub const DEFAULT_OWNER_REQUIRED: u64 = 5;

// ============================================================================
// SECTION: Scopes
// ============================================================================

/// Granularity at which seed data is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "owner", rename_all = "snake_case")]
pub enum SeedScope {
    /// Data shared by every role.
    Global,
    /// Data owned by a single identity.
    Owner(IdentityId),
}

impl SeedScope {
    /// Returns the owning identity for per-owner scopes.
    #[must_use]
    pub const fn owner(&self) -> Option<&IdentityId> {
        match self {
            Self::Global => None,
            Self::Owner(owner) => Some(owner),
        }
    }
}

impl fmt::Display for SeedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Owner(owner) => write!(f, "owner:{owner}"),
        }
    }
}

/// Scope kinds referenced by the role seed plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The shared global scope.
    Global,
    /// The scope owned by the leased identity.
    Owner,
}

impl ScopeKind {
    /// Materializes the concrete scope for the leased identity.
    #[must_use]
    pub fn scope_for(self, identity: &Identity) -> SeedScope {
        match self {
            Self::Global => SeedScope::Global,
            Self::Owner => SeedScope::Owner(identity.id().clone()),
        }
    }
}

/// Seed plan for administrators.
const ADMIN_PLAN: &[ScopeKind] = &[ScopeKind::Global];
/// Seed plan for editors: shared data plus editor-owned data.
const EDITOR_PLAN: &[ScopeKind] = &[ScopeKind::Global, ScopeKind::Owner];
/// Seed plan for viewers; viewers never own data.
const VIEWER_PLAN: &[ScopeKind] = &[ScopeKind::Global];

/// Returns the ordered scopes that must be satisfied for a role.
#[must_use]
pub const fn seed_plan(role: Role) -> &'static [ScopeKind] {
    match role {
        Role::Admin => ADMIN_PLAN,
        Role::Editor => EDITOR_PLAN,
        Role::Viewer => VIEWER_PLAN,
    }
}

// ============================================================================
// SECTION: Thresholds
// ============================================================================

/// Minimum record counts that define "sufficient data" per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedThresholds {
    /// Required count in the global scope.
    pub global: u64,
    /// Required count in each owner scope.
    pub per_owner: u64,
}

impl Default for SeedThresholds {
    fn default() -> Self {
        Self {
            global: DEFAULT_GLOBAL_REQUIRED,
            per_owner: DEFAULT_OWNER_REQUIRED,
        }
    }
}

impl SeedThresholds {
    /// Returns the required count for a scope.
    #[must_use]
    pub const fn for_scope(&self, scope: &SeedScope) -> u64 {
        match scope {
            SeedScope::Global => self.global,
            SeedScope::Owner(_) => self.per_owner,
        }
    }
}

// ============================================================================
// SECTION: Filters
// ============================================================================

/// Existence-check filter passed to the data-access client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemFilter {
    /// Restricts the count to records created by this identity.
    pub created_by: Option<IdentityId>,
}

impl ItemFilter {
    /// Builds the filter that counts records for a scope.
    #[must_use]
    pub fn for_scope(scope: &SeedScope) -> Self {
        Self {
            created_by: scope.owner().cloned(),
        }
    }
}

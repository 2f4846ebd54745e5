// crates/fixture-lease-core/src/core/identity.rs
// ============================================================================
// Module: Fixture Lease Identities
// Description: Role-tagged test identities and their stable identifiers.
// Purpose: Provide the immutable credential records leased to test cases.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identities are loaded once at session start and never mutated. Each identity
//! belongs to exactly one [`Role`]; the role partitions the leasing pool and
//! selects the seed plan applied before a test runs.
//!
//! The authentication cache keys identities by email, so an email must map to a
//! single identity for the lifetime of a session.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::FixtureError;

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Role that partitions the identity pool.
///
/// # Invariants
/// - The set of roles is closed; adding a role requires extending the seed plan
///   table, which the compiler enforces through exhaustive matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full administrative access; seeds global data.
    Admin,
    /// Content editor owning per-editor data.
    Editor,
    /// Read-only viewer.
    Viewer,
}

impl Role {
    /// All roles in marker resolution order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Editor, Self::Viewer];

    /// Returns the canonical role label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Editor => "EDITOR",
            Self::Viewer => "VIEWER",
        }
    }

    /// Returns the lowercase test marker that selects this role.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Resolves the role requested by a test from its markers.
    ///
    /// Markers are checked in `admin`, `editor`, `viewer` order; the first role
    /// whose marker is present wins. Tests without a role marker run as
    /// [`Role::Admin`].
    #[must_use]
    pub fn from_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers: Vec<S> = markers.into_iter().collect();
        Self::ALL
            .into_iter()
            .find(|role| markers.iter().any(|marker| marker.as_ref() == role.marker()))
            .unwrap_or(Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FixtureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|role| trimmed.eq_ignore_ascii_case(role.as_str()))
            .ok_or_else(|| FixtureError::UnsupportedRole(value.to_string()))
    }
}

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Identity identifier, unique within a role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    /// Creates a new identity identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for IdentityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for IdentityId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Role-tagged test credential record.
///
/// # Invariants
/// - Fields are immutable after construction.
/// - The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Identifier unique within the role.
    id: IdentityId,
    /// Login email; doubles as the authentication cache key.
    email: String,
    /// Login password.
    password: String,
    /// Role the identity belongs to.
    role: Role,
}

impl Identity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(
        id: impl Into<IdentityId>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            password: password.into(),
            role,
        }
    }

    /// Creates an identity keyed by email when no separate id is issued.
    #[must_use]
    pub fn from_email(email: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        let email = email.into();
        Self::new(IdentityId::new(email.clone()), email, password, role)
    }

    /// Returns the identity identifier.
    #[must_use]
    pub const fn id(&self) -> &IdentityId {
        &self.id
    }

    /// Returns the login email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the login password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the identity role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the stable key used by the authentication cache.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

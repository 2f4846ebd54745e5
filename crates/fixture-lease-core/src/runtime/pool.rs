// crates/fixture-lease-core/src/runtime/pool.rs
// ============================================================================
// Module: Fixture Lease Identity Pool
// Description: Role-partitioned identity pool with exclusive leasing.
// Purpose: Hand each concurrently running test its own identity.
// Dependencies: crate::core, crate::audit
// ============================================================================

//! ## Overview
//! [`IdentityPool`] holds a fixed, ordered list of identities per role and a
//! lease set per role. One mutex guards every lease set; it is held only for
//! the scan-and-mark of [`IdentityPool::acquire`] and the removal in
//! [`IdentityPool::release`], never across a test body or any I/O.
//!
//! Invariants:
//! - Identities are scanned in insertion order, so leasing is deterministic.
//! - A leased identity is never handed out again until released.
//! - Lease sets only ever contain ids from the matching role's pool.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::audit::FixtureAuditEvent;
use crate::audit::FixtureAuditSink;
use crate::audit::FixtureEventKind;
use crate::audit::NoopAuditSink;
use crate::core::FixtureError;
use crate::core::Identity;
use crate::core::IdentityId;
use crate::core::Role;

// ============================================================================
// SECTION: Identity Pool
// ============================================================================

/// Leased identity ids per role.
type LeaseSets = BTreeMap<Role, BTreeSet<IdentityId>>;

/// Fixed pool of identities leased exclusively to running tests.
pub struct IdentityPool {
    /// Identities per role in lease preference order.
    pools: BTreeMap<Role, Vec<Identity>>,
    /// Currently leased identity ids per role.
    leased: Mutex<LeaseSets>,
    /// Audit sink for lease activity.
    audit: Arc<dyn FixtureAuditSink>,
}

impl IdentityPool {
    /// Builds a pool from identities in preference order.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidPool`] when an id repeats within a role,
    /// or [`FixtureError::IdentityConflict`] when an email is reused.
    pub fn new<I>(identities: I) -> Result<Self, FixtureError>
    where
        I: IntoIterator<Item = Identity>,
    {
        Self::with_audit(identities, Arc::new(NoopAuditSink))
    }

    /// Builds a pool that reports lease activity to an audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidPool`] when an id repeats within a role,
    /// or [`FixtureError::IdentityConflict`] when an email is reused.
    pub fn with_audit<I>(
        identities: I,
        audit: Arc<dyn FixtureAuditSink>,
    ) -> Result<Self, FixtureError>
    where
        I: IntoIterator<Item = Identity>,
    {
        let mut pools: BTreeMap<Role, Vec<Identity>> = BTreeMap::new();
        let mut emails: BTreeMap<String, Role> = BTreeMap::new();
        for identity in identities {
            let members = pools.entry(identity.role()).or_default();
            if members.iter().any(|member| member.id() == identity.id()) {
                return Err(FixtureError::InvalidPool(format!(
                    "duplicate identity id {} for role {}",
                    identity.id(),
                    identity.role()
                )));
            }
            if let Some(existing) = emails.get(identity.email()) {
                return Err(FixtureError::IdentityConflict(format!(
                    "email {} already assigned to a {existing} identity",
                    identity.email()
                )));
            }
            emails.insert(identity.email().to_string(), identity.role());
            members.push(identity);
        }
        Ok(Self {
            pools,
            leased: Mutex::new(BTreeMap::new()),
            audit,
        })
    }

    /// Leases the first free identity for the role.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::PoolExhausted`] when every identity for the role
    /// is leased. The call never waits or retries.
    pub fn acquire(&self, role: Role) -> Result<Identity, FixtureError> {
        let members = self.identities(role);
        let mut leased = self.lock_leased();
        let role_leases = leased.entry(role).or_default();
        let found = members.iter().find(|identity| !role_leases.contains(identity.id())).cloned();
        if let Some(identity) = &found {
            role_leases.insert(identity.id().clone());
        }
        drop(leased);

        match found {
            Some(identity) => {
                self.audit.record(
                    &FixtureAuditEvent::new(FixtureEventKind::LeaseAcquired)
                        .with_role(role)
                        .with_identity(identity.id()),
                );
                Ok(identity)
            }
            None => {
                self.audit.record(
                    &FixtureAuditEvent::new(FixtureEventKind::PoolExhausted).with_role(role),
                );
                Err(FixtureError::PoolExhausted {
                    role,
                })
            }
        }
    }

    /// Returns an identity to the pool.
    ///
    /// Releasing an identity that is not leased is a no-op.
    pub fn release(&self, identity: &Identity) {
        let removed = self
            .lock_leased()
            .get_mut(&identity.role())
            .is_some_and(|role_leases| role_leases.remove(identity.id()));
        if removed {
            self.audit.record(
                &FixtureAuditEvent::new(FixtureEventKind::LeaseReleased)
                    .with_role(identity.role())
                    .with_identity(identity.id()),
            );
        }
    }

    /// Leases an identity that is released when the returned guard drops.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::PoolExhausted`] when no identity is free.
    pub fn lease(&self, role: Role) -> Result<Lease<'_>, FixtureError> {
        let identity = self.acquire(role)?;
        Ok(Lease {
            pool: self,
            identity,
        })
    }

    /// Returns the identities configured for a role in preference order.
    #[must_use]
    pub fn identities(&self, role: Role) -> &[Identity] {
        self.pools.get(&role).map_or(&[][..], Vec::as_slice)
    }

    /// Returns the number of identities configured for a role.
    #[must_use]
    pub fn pool_size(&self, role: Role) -> usize {
        self.identities(role).len()
    }

    /// Returns the number of identities currently leased for a role.
    #[must_use]
    pub fn leased_count(&self, role: Role) -> usize {
        self.lock_leased().get(&role).map_or(0, BTreeSet::len)
    }

    /// Returns true when the identity is currently leased.
    #[must_use]
    pub fn is_leased(&self, identity: &Identity) -> bool {
        self.lock_leased()
            .get(&identity.role())
            .is_some_and(|role_leases| role_leases.contains(identity.id()))
    }

    /// Locks the lease sets, recovering from poisoning.
    ///
    /// Every critical section is a single insert or remove, so a poisoned
    /// lock still guards a consistent map.
    fn lock_leased(&self) -> MutexGuard<'_, LeaseSets> {
        self.leased.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// SECTION: Lease Guard
// ============================================================================

/// Exclusive claim on an identity for the duration of a test.
///
/// # Invariants
/// - The identity is released when the guard drops, including during
///   unwinding from a failed test.
pub struct Lease<'a> {
    /// Pool the identity is returned to.
    pool: &'a IdentityPool,
    /// Leased identity.
    identity: Identity,
}

impl Lease<'_> {
    /// Returns the leased identity.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the role of the leased identity.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.identity.role()
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.pool.release(&self.identity);
    }
}

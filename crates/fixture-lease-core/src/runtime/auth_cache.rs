// crates/fixture-lease-core/src/runtime/auth_cache.rs
// ============================================================================
// Module: Fixture Lease Auth Cache
// Description: Per-identity memoization of login-produced auth state.
// Purpose: Log each identity in once per session and reuse the result.
// Dependencies: crate::core, crate::interfaces, crate::audit
// ============================================================================

//! ## Overview
//! [`AuthStateCache`] stores the state returned by an [`Authenticator`] under
//! the identity key (the email). Entries are never invalidated for the life of
//! the cache.
//!
//! The cache does not coalesce concurrent logins: callers gate
//! [`AuthStateCache::login_and_store`] behind [`AuthStateCache::exists`]. The
//! identity pool guarantees a single holder per identity, so two tests never
//! race to populate the same key. The backing map is still mutex-guarded
//! because different keys are written from parallel workers. Logins run
//! outside the lock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
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
use crate::interfaces::Authenticator;

// ============================================================================
// SECTION: Entries
// ============================================================================

/// Cached state together with the identity that produced it.
struct CacheEntry<S> {
    /// Role of the identity that owns the key.
    role: Role,
    /// Identifier of the identity that owns the key.
    identity_id: IdentityId,
    /// Authenticated state returned by the login strategy.
    state: S,
}

impl<S> CacheEntry<S> {
    /// Rejects lookups where the key belongs to a different identity.
    fn check_owner(&self, identity: &Identity) -> Result<(), FixtureError> {
        if self.role == identity.role() && &self.identity_id == identity.id() {
            return Ok(());
        }
        Err(FixtureError::IdentityConflict(format!(
            "key {} is cached for {} identity {}, not {} identity {}",
            identity.key(),
            self.role,
            self.identity_id,
            identity.role(),
            identity.id()
        )))
    }
}

// ============================================================================
// SECTION: Auth State Cache
// ============================================================================

/// Session-lifetime cache of authenticated state per identity.
pub struct AuthStateCache<A: Authenticator> {
    /// Login strategy used to populate entries.
    authenticator: A,
    /// Cached entries keyed by identity key.
    entries: Mutex<BTreeMap<String, CacheEntry<A::State>>>,
    /// Audit sink for login activity.
    audit: Arc<dyn FixtureAuditSink>,
}

impl<A: Authenticator> AuthStateCache<A> {
    /// Creates an empty cache around a login strategy.
    #[must_use]
    pub fn new(authenticator: A) -> Self {
        Self::with_audit(authenticator, Arc::new(NoopAuditSink))
    }

    /// Creates an empty cache that reports logins to an audit sink.
    #[must_use]
    pub fn with_audit(authenticator: A, audit: Arc<dyn FixtureAuditSink>) -> Self {
        Self {
            authenticator,
            entries: Mutex::new(BTreeMap::new()),
            audit,
        }
    }

    /// Returns true when state is cached under the identity key.
    #[must_use]
    pub fn exists(&self, identity: &Identity) -> bool {
        self.lock_entries().contains_key(identity.key())
    }

    /// Returns the cached state without triggering a login.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NotCached`] when nothing is cached for the key,
    /// or [`FixtureError::IdentityConflict`] when the key belongs to another
    /// identity.
    pub fn get(&self, identity: &Identity) -> Result<A::State, FixtureError> {
        let entries = self.lock_entries();
        let entry = entries.get(identity.key()).ok_or_else(|| FixtureError::NotCached {
            key: identity.key().to_string(),
        })?;
        entry.check_owner(identity)?;
        Ok(entry.state.clone())
    }

    /// Logs the identity in, stores the resulting state, and returns it.
    ///
    /// A second call for the same identity logs in again and overwrites the
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::IdentityConflict`] when the key belongs to
    /// another identity, or [`FixtureError::Upstream`] when the login fails.
    pub fn login_and_store(&self, identity: &Identity) -> Result<A::State, FixtureError> {
        if let Some(entry) = self.lock_entries().get(identity.key()) {
            entry.check_owner(identity)?;
        }

        let state = self.authenticator.authenticate(identity)?;

        let mut entries = self.lock_entries();
        if let Some(entry) = entries.get(identity.key()) {
            entry.check_owner(identity)?;
        }
        entries.insert(
            identity.key().to_string(),
            CacheEntry {
                role: identity.role(),
                identity_id: identity.id().clone(),
                state: state.clone(),
            },
        );
        drop(entries);

        self.audit.record(
            &FixtureAuditEvent::new(FixtureEventKind::AuthLogin)
                .with_role(identity.role())
                .with_identity(identity.id()),
        );
        Ok(state)
    }

    /// Returns cached state, logging in first when the identity is not cached.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::get`] and [`Self::login_and_store`].
    pub fn resolve(&self, identity: &Identity) -> Result<A::State, FixtureError> {
        if self.exists(identity) {
            let state = self.get(identity)?;
            self.audit.record(
                &FixtureAuditEvent::new(FixtureEventKind::AuthCacheHit)
                    .with_role(identity.role())
                    .with_identity(identity.id()),
            );
            return Ok(state);
        }
        self.login_and_store(identity)
    }

    /// Returns the number of cached identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Locks the entry map, recovering from poisoning.
    fn lock_entries(&self) -> MutexGuard<'_, BTreeMap<String, CacheEntry<A::State>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

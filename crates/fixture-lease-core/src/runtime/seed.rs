// crates/fixture-lease-core/src/runtime/seed.rs
// ============================================================================
// Module: Fixture Lease Seed Orchestrator
// Description: Idempotent per-scope reconciliation of baseline backend data.
// Purpose: Guarantee minimum record counts exist before a test runs.
// Dependencies: crate::core, crate::interfaces, crate::audit, serde
// ============================================================================

//! ## Overview
//! [`SeedOrchestrator`] evaluates each scope of a role's seed plan once per
//! session. A scope starts unknown; the first `ensure` counts existing records
//! and creates the payload batch when the count is below the threshold. The
//! scope is then marked satisfied without re-querying the count, so a batch
//! too small to close the gap is rejected before anything is created.
//!
//! When reset is enabled every `ensure` deletes the scope's seed-tagged
//! records and recreates the batch, bypassing memoization. This is the only
//! path that performs destructive I/O.
//!
//! Each scope has its own lock, held for the whole evaluation, so concurrent
//! first use of the global scope creates a single batch and concurrent resets
//! never interleave. The scope table lock itself only guards lookup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde::Serialize;

use crate::audit::FixtureAuditEvent;
use crate::audit::FixtureAuditSink;
use crate::audit::FixtureEventKind;
use crate::audit::NoopAuditSink;
use crate::core::FixtureError;
use crate::core::Identity;
use crate::core::ItemFilter;
use crate::core::Role;
use crate::core::ScopeKind;
use crate::core::SeedScope;
use crate::core::SeedThresholds;
use crate::core::seed_plan;
use crate::interfaces::DataAccessClient;
use crate::interfaces::OwnerClientProvider;
use crate::interfaces::PayloadBuilder;
use crate::interfaces::SeedCleaner;

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Result of evaluating one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// The scope was already satisfied earlier in the session.
    Memoized,
    /// Enough records already existed.
    Present {
        /// Existing record count.
        total: u64,
    },
    /// The payload batch was created because records were missing.
    Created {
        /// Record count before creation.
        existing: u64,
        /// Records created.
        created: u64,
    },
    /// Seed records were deleted and the batch recreated.
    Reset {
        /// Records created after the delete.
        created: u64,
    },
}

/// Outcome for a single scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeReport {
    /// Evaluated scope.
    pub scope: SeedScope,
    /// What the orchestrator did for the scope.
    pub outcome: SeedOutcome,
}

/// Outcomes for every scope in a role's seed plan, in plan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Role the plan was applied for.
    pub role: Role,
    /// Per-scope outcomes.
    pub scopes: Vec<ScopeReport>,
}

impl SeedReport {
    /// Returns the total number of records created across scopes.
    #[must_use]
    pub fn created(&self) -> u64 {
        self.scopes
            .iter()
            .map(|report| match report.outcome {
                SeedOutcome::Created {
                    created, ..
                }
                | SeedOutcome::Reset {
                    created,
                } => created,
                SeedOutcome::Memoized | SeedOutcome::Present { .. } => 0,
            })
            .sum()
    }
}

// ============================================================================
// SECTION: Scope State
// ============================================================================

/// Memoized satisfaction state of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScopeStatus {
    /// Not evaluated yet this session.
    #[default]
    Unknown,
    /// Known to hold enough records.
    Satisfied,
}

/// Per-scope state guarded by the scope lock.
#[derive(Default)]
struct ScopeCell {
    /// Memoized status.
    status: ScopeStatus,
    /// Client bound to the scope once connected.
    client: Option<Arc<dyn DataAccessClient>>,
}

/// Shared handle to a scope cell.
type ScopeHandle = Arc<Mutex<ScopeCell>>;

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for a seed orchestrator.
///
/// # Invariants
/// - `build` succeeds only when an admin client and payload builder are set.
/// - Reset mode requires a cleaner.
/// - A fixed-size payload batch covers the largest threshold.
#[derive(Default)]
pub struct SeedOrchestratorBuilder {
    /// Client authenticated as an administrator.
    admin_client: Option<Arc<dyn DataAccessClient>>,
    /// Provider of owner-authenticated clients.
    owner_clients: Option<Arc<dyn OwnerClientProvider>>,
    /// Payload builder for missing data.
    payloads: Option<Arc<dyn PayloadBuilder>>,
    /// Destructive cleanup client.
    cleaner: Option<Arc<dyn SeedCleaner>>,
    /// Force-reset flag.
    reset: bool,
    /// Required counts per scope.
    thresholds: SeedThresholds,
    /// Audit sink for seeding activity.
    audit: Option<Arc<dyn FixtureAuditSink>>,
}

impl SeedOrchestratorBuilder {
    /// Sets the administrator client used for the global scope.
    #[must_use]
    pub fn admin_client(mut self, client: Arc<dyn DataAccessClient>) -> Self {
        self.admin_client = Some(client);
        self
    }

    /// Sets the provider of owner-authenticated clients.
    #[must_use]
    pub fn owner_clients(mut self, provider: Arc<dyn OwnerClientProvider>) -> Self {
        self.owner_clients = Some(provider);
        self
    }

    /// Sets the payload builder.
    #[must_use]
    pub fn payload_builder(mut self, builder: Arc<dyn PayloadBuilder>) -> Self {
        self.payloads = Some(builder);
        self
    }

    /// Sets the destructive cleanup client.
    #[must_use]
    pub fn cleaner(mut self, cleaner: Arc<dyn SeedCleaner>) -> Self {
        self.cleaner = Some(cleaner);
        self
    }

    /// Enables or disables forced reset.
    #[must_use]
    pub const fn reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Overrides the required counts.
    #[must_use]
    pub const fn thresholds(mut self, thresholds: SeedThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Sets the audit sink.
    #[must_use]
    pub fn audit(mut self, audit: Arc<dyn FixtureAuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Builds the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Misconfigured`] when a required collaborator is
    /// missing or the payload batch is smaller than a threshold.
    pub fn build(self) -> Result<SeedOrchestrator, FixtureError> {
        let admin_client = self
            .admin_client
            .ok_or_else(|| FixtureError::Misconfigured("admin client is required".to_string()))?;
        let payloads = self
            .payloads
            .ok_or_else(|| FixtureError::Misconfigured("payload builder is required".to_string()))?;
        if self.reset && self.cleaner.is_none() {
            return Err(FixtureError::Misconfigured(
                "seed reset requires a cleanup client".to_string(),
            ));
        }
        let required = self.thresholds.global.max(self.thresholds.per_owner);
        if let Some(size) = payloads.batch_size()
            && size < required
        {
            return Err(FixtureError::Misconfigured(format!(
                "payload batch of {size} records cannot reach the required count of {required}"
            )));
        }
        Ok(SeedOrchestrator {
            admin_client,
            owner_clients: self.owner_clients,
            payloads,
            cleaner: self.cleaner,
            reset: self.reset,
            thresholds: self.thresholds,
            scopes: Mutex::new(BTreeMap::new()),
            audit: self.audit.unwrap_or_else(|| Arc::new(NoopAuditSink)),
        })
    }
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Ensures seed data preconditions for roles and owners.
pub struct SeedOrchestrator {
    /// Client authenticated as an administrator.
    admin_client: Arc<dyn DataAccessClient>,
    /// Provider of owner-authenticated clients.
    owner_clients: Option<Arc<dyn OwnerClientProvider>>,
    /// Payload builder for missing data.
    payloads: Arc<dyn PayloadBuilder>,
    /// Destructive cleanup client, present when reset is possible.
    cleaner: Option<Arc<dyn SeedCleaner>>,
    /// Force-reset flag fixed at construction.
    reset: bool,
    /// Required counts per scope.
    thresholds: SeedThresholds,
    /// Scope cells keyed by scope.
    scopes: Mutex<BTreeMap<SeedScope, ScopeHandle>>,
    /// Audit sink for seeding activity.
    audit: Arc<dyn FixtureAuditSink>,
}

impl SeedOrchestrator {
    /// Returns a new orchestrator builder.
    #[must_use]
    pub fn builder() -> SeedOrchestratorBuilder {
        SeedOrchestratorBuilder::default()
    }

    /// Returns true when forced reset is enabled.
    #[must_use]
    pub const fn reset_enabled(&self) -> bool {
        self.reset
    }

    /// Returns the configured thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> SeedThresholds {
        self.thresholds
    }

    /// Returns true when the scope is memoized as satisfied.
    ///
    /// Waits for an in-flight evaluation of the same scope; other scopes are
    /// never blocked.
    #[must_use]
    pub fn is_satisfied(&self, scope: &SeedScope) -> bool {
        let handle = self.lock_scopes().get(scope).map(Arc::clone);
        handle.is_some_and(|cell| {
            cell.lock().unwrap_or_else(PoisonError::into_inner).status == ScopeStatus::Satisfied
        })
    }

    /// Applies the seed plan for a role, using `identity` for owner scopes.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Upstream`] when a collaborator fails, or
    /// [`FixtureError::Misconfigured`] when an owner scope has no client
    /// provider or a payload batch cannot cover the missing records.
    pub fn ensure(&self, role: Role, identity: &Identity) -> Result<SeedReport, FixtureError> {
        let scopes = seed_plan(role)
            .iter()
            .map(|kind| self.ensure_scope(kind.scope_for(identity), Some(identity)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SeedReport {
            role,
            scopes,
        })
    }

    /// Applies the seed plan for a role given by its label.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::UnsupportedRole`] for unknown labels, plus the
    /// errors of [`Self::ensure`].
    pub fn ensure_role(&self, role: &str, identity: &Identity) -> Result<SeedReport, FixtureError> {
        let role: Role = role.parse()?;
        self.ensure(role, identity)
    }

    /// Ensures the global scope using the administrator client.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Upstream`] when a collaborator fails, or
    /// [`FixtureError::Misconfigured`] when the payload batch is too small.
    pub fn ensure_global(&self) -> Result<ScopeReport, FixtureError> {
        self.ensure_scope(SeedScope::Global, None)
    }

    /// Ensures the scope owned by `owner` using a client authenticated as them.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Misconfigured`] when no owner client provider is
    /// set, or [`FixtureError::Upstream`] when a collaborator fails.
    pub fn ensure_owner(&self, owner: &Identity) -> Result<ScopeReport, FixtureError> {
        self.ensure_scope(ScopeKind::Owner.scope_for(owner), Some(owner))
    }

    /// Returns the client that reads and writes a scope.
    fn connect(
        &self,
        scope: &SeedScope,
        owner: Option<&Identity>,
    ) -> Result<Arc<dyn DataAccessClient>, FixtureError> {
        let SeedScope::Owner(owner_id) = scope else {
            return Ok(Arc::clone(&self.admin_client));
        };
        let owner = owner.filter(|identity| identity.id() == owner_id).ok_or_else(|| {
            FixtureError::Misconfigured(format!("owner scope for {owner_id} requires its identity"))
        })?;
        let provider = self.owner_clients.as_ref().ok_or_else(|| {
            FixtureError::Misconfigured(format!(
                "owner scope for {owner_id} requires an owner client provider"
            ))
        })?;
        provider.client_for(owner).map_err(FixtureError::from)
    }

    /// Evaluates one scope under its lock.
    fn ensure_scope(
        &self,
        scope: SeedScope,
        owner: Option<&Identity>,
    ) -> Result<ScopeReport, FixtureError> {
        let handle = self.scope_handle(&scope);
        let mut cell = handle.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.reset && cell.status == ScopeStatus::Satisfied {
            self.audit.record(
                &FixtureAuditEvent::new(FixtureEventKind::SeedMemoized).with_scope(&scope),
            );
            return Ok(ScopeReport {
                scope,
                outcome: SeedOutcome::Memoized,
            });
        }

        let client = match &cell.client {
            Some(client) => Arc::clone(client),
            None => {
                let client = self.connect(&scope, owner)?;
                cell.client = Some(Arc::clone(&client));
                client
            }
        };

        let required = self.thresholds.for_scope(&scope);
        let outcome = if self.reset {
            self.delete_scope(&scope)?;
            let created = self.create_batch(client.as_ref(), &scope, required)?;
            self.audit.record(
                &FixtureAuditEvent::new(FixtureEventKind::SeedReset)
                    .with_scope(&scope)
                    .with_count(created),
            );
            SeedOutcome::Reset {
                created,
            }
        } else {
            let existing = client.count(&ItemFilter::for_scope(&scope))?;
            if existing >= required {
                self.audit.record(
                    &FixtureAuditEvent::new(FixtureEventKind::SeedPresent)
                        .with_scope(&scope)
                        .with_count(existing),
                );
                SeedOutcome::Present {
                    total: existing,
                }
            } else {
                let created =
                    self.create_batch(client.as_ref(), &scope, required - existing)?;
                self.audit.record(
                    &FixtureAuditEvent::new(FixtureEventKind::SeedCreated)
                        .with_scope(&scope)
                        .with_count(created),
                );
                SeedOutcome::Created {
                    existing,
                    created,
                }
            }
        };

        cell.status = ScopeStatus::Satisfied;
        Ok(ScopeReport {
            scope,
            outcome,
        })
    }

    /// Deletes the seed-tagged records of a scope.
    fn delete_scope(&self, scope: &SeedScope) -> Result<(), FixtureError> {
        let cleaner = self.cleaner.as_ref().ok_or_else(|| {
            FixtureError::Misconfigured("seed reset requires a cleanup client".to_string())
        })?;
        match scope {
            SeedScope::Global => cleaner.delete_all_seed_records()?,
            SeedScope::Owner(owner) => cleaner.delete_seed_records_for_owner(owner)?,
        }
        Ok(())
    }

    /// Submits the payload batch for a scope and returns the created count.
    ///
    /// A batch smaller than `missing` is rejected before any record is
    /// created, so the scope never reads as satisfied below its threshold.
    fn create_batch(
        &self,
        client: &dyn DataAccessClient,
        scope: &SeedScope,
        missing: u64,
    ) -> Result<u64, FixtureError> {
        let payloads = self.payloads.build(scope.owner());
        let available = u64::try_from(payloads.len()).unwrap_or(u64::MAX);
        if available < missing {
            return Err(FixtureError::Misconfigured(format!(
                "payload batch of {available} records cannot cover {missing} missing in {scope}"
            )));
        }
        let mut created = 0_u64;
        for payload in payloads {
            client.create(&payload)?;
            created += 1;
        }
        Ok(created)
    }

    /// Returns the cell for a scope, creating it on first use.
    fn scope_handle(&self, scope: &SeedScope) -> ScopeHandle {
        let mut scopes = self.lock_scopes();
        Arc::clone(scopes.entry(scope.clone()).or_default())
    }

    /// Locks the scope table, recovering from poisoning.
    fn lock_scopes(&self) -> MutexGuard<'_, BTreeMap<SeedScope, ScopeHandle>> {
        self.scopes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

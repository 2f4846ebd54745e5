// crates/fixture-lease-core/src/runtime/memory.rs
// ============================================================================
// Module: Fixture Lease In-Memory Backend
// Description: In-memory item collection implementing data access and cleanup.
// Purpose: Provide a deterministic backend for tests and local dry runs.
// Dependencies: crate::core, crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! [`InMemoryBackend`] stores items as JSON objects and records every
//! operation it receives. Clones share state, so one instance can serve as
//! both the admin client and the cleanup client while tests inspect the call
//! log.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde_json::Value;

use crate::core::IdentityId;
use crate::core::ItemFilter;
use crate::core::SEED_TAG;
use crate::core::UpstreamError;
use crate::interfaces::DataAccessClient;
use crate::interfaces::SeedCleaner;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Operation received by the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOp {
    /// Existence check with its owner filter.
    Count {
        /// Owner filter, when scoped.
        created_by: Option<IdentityId>,
    },
    /// Single record creation.
    Create,
    /// Deletion of every seed-tagged record.
    DeleteAll,
    /// Deletion of one owner's seed-tagged records.
    DeleteOwner(IdentityId),
}

/// Per-operation call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendCalls {
    /// Count requests.
    pub count: usize,
    /// Create requests.
    pub create: usize,
    /// Global seed deletions.
    pub delete_all: usize,
    /// Owner-scoped seed deletions.
    pub delete_owner: usize,
}

/// Mutable backend state.
#[derive(Debug, Default)]
struct BackendState {
    /// Stored items in insertion order.
    records: Vec<Value>,
    /// Operation log in arrival order.
    operations: Vec<BackendOp>,
    /// Status returned for creates when set.
    create_failure: Option<u16>,
    /// Next identifier assigned to created records.
    next_id: u64,
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// In-memory item collection for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    /// Shared state protected by a mutex.
    state: Arc<Mutex<BackendState>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding `count` seed records owned by `owner`.
    #[must_use]
    pub fn with_records(count: u64, owner: Option<&IdentityId>) -> Self {
        let backend = Self::new();
        for _ in 0..count {
            backend.insert(seed_record(owner));
        }
        backend
    }

    /// Inserts a record without logging an operation.
    pub fn insert(&self, record: Value) {
        self.lock_state().records.push(record);
    }

    /// Returns every stored record.
    #[must_use]
    pub fn records(&self) -> Vec<Value> {
        self.lock_state().records.clone()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_state().records.len()
    }

    /// Returns true when no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_state().records.is_empty()
    }

    /// Makes subsequent creates fail with the given status, or succeed again.
    pub fn set_create_failure(&self, status: Option<u16>) {
        self.lock_state().create_failure = status;
    }

    /// Returns the operation log.
    #[must_use]
    pub fn operations(&self) -> Vec<BackendOp> {
        self.lock_state().operations.clone()
    }

    /// Returns per-operation call counts.
    #[must_use]
    pub fn calls(&self) -> BackendCalls {
        self.lock_state().operations.iter().fold(BackendCalls::default(), |mut calls, op| {
            match op {
                BackendOp::Count { .. } => calls.count += 1,
                BackendOp::Create => calls.create += 1,
                BackendOp::DeleteAll => calls.delete_all += 1,
                BackendOp::DeleteOwner(_) => calls.delete_owner += 1,
            }
            calls
        })
    }

    /// Locks the backend state, recovering from poisoning.
    fn lock_state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DataAccessClient for InMemoryBackend {
    fn count(&self, filter: &ItemFilter) -> Result<u64, UpstreamError> {
        let mut state = self.lock_state();
        state.operations.push(BackendOp::Count {
            created_by: filter.created_by.clone(),
        });
        let total = state
            .records
            .iter()
            .filter(|record| {
                filter
                    .created_by
                    .as_ref()
                    .is_none_or(|owner| created_by(record) == Some(owner.as_str()))
            })
            .count();
        u64::try_from(total).map_err(|err| UpstreamError::Decode(err.to_string()))
    }

    fn create(&self, payload: &Value) -> Result<Value, UpstreamError> {
        let mut state = self.lock_state();
        state.operations.push(BackendOp::Create);
        if let Some(status) = state.create_failure {
            return Err(UpstreamError::Status {
                operation: "create item".to_string(),
                status,
            });
        }
        state.next_id += 1;
        let mut record = payload.clone();
        if let Value::Object(fields) = &mut record {
            fields.insert("_id".to_string(), Value::String(format!("item-{}", state.next_id)));
        }
        state.records.push(record.clone());
        Ok(record)
    }
}

impl SeedCleaner for InMemoryBackend {
    fn delete_all_seed_records(&self) -> Result<(), UpstreamError> {
        let mut state = self.lock_state();
        state.operations.push(BackendOp::DeleteAll);
        state.records.retain(|record| !has_seed_tag(record));
        Ok(())
    }

    fn delete_seed_records_for_owner(&self, owner: &IdentityId) -> Result<(), UpstreamError> {
        let mut state = self.lock_state();
        state.operations.push(BackendOp::DeleteOwner(owner.clone()));
        state
            .records
            .retain(|record| !(has_seed_tag(record) && created_by(record) == Some(owner.as_str())));
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a minimal seed-tagged record.
fn seed_record(owner: Option<&IdentityId>) -> Value {
    serde_json::json!({
        "tags": [SEED_TAG],
        "created_by": owner.map(IdentityId::as_str),
    })
}

/// Returns the record's `created_by` field.
fn created_by(record: &Value) -> Option<&str> {
    record.get("created_by").and_then(Value::as_str)
}

/// Returns true when the record carries the seed tag.
fn has_seed_tag(record: &Value) -> bool {
    record
        .get("tags")
        .and_then(Value::as_array)
        .is_some_and(|tags| tags.iter().any(|tag| tag.as_str() == Some(SEED_TAG)))
}

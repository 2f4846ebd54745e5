// crates/fixture-lease-core/tests/common/mod.rs
// ============================================================================
// Module: Fixture Lease Test Helpers
// Description: Shared identities, audit recorders, and counting collaborators.
// Purpose: Keep integration tests focused on behavior rather than setup.
// Dependencies: fixture-lease-core
// ============================================================================

//! Shared helpers for fixture-lease-core integration tests.

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers.")]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use fixture_lease_core::DataAccessClient;
use fixture_lease_core::FixtureAuditEvent;
use fixture_lease_core::FixtureAuditSink;
use fixture_lease_core::FixtureEventKind;
use fixture_lease_core::FnAuthenticator;
use fixture_lease_core::Identity;
use fixture_lease_core::IdentityId;
use fixture_lease_core::InMemoryBackend;
use fixture_lease_core::OwnerClientProvider;
use fixture_lease_core::PayloadBuilder;
use fixture_lease_core::Role;
use fixture_lease_core::UpstreamError;
use serde_json::Value;
use serde_json::json;

/// Builds an identity whose email is derived from its id.
pub fn identity(id: &str, role: Role) -> Identity {
    Identity::new(id, format!("{id}@test.com"), format!("{id}-password"), role)
}

/// Standard pool: two admins, two editors, one viewer.
pub fn standard_identities() -> Vec<Identity> {
    vec![
        identity("a1", Role::Admin),
        identity("a2", Role::Admin),
        identity("e1", Role::Editor),
        identity("e2", Role::Editor),
        identity("v1", Role::Viewer),
    ]
}

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<FixtureAuditEvent>>,
}

impl RecordingAuditSink {
    pub fn events(&self) -> Vec<FixtureAuditEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<FixtureEventKind> {
        self.events().into_iter().map(|event| event.event).collect()
    }
}

impl FixtureAuditSink for RecordingAuditSink {
    fn record(&self, event: &FixtureAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Authenticator that returns `token-<id>` and counts invocations.
pub fn counting_authenticator() -> (FnAuthenticator<String>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let authenticator = FnAuthenticator::new(move |identity: &Identity| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("token-{}", identity.id()))
    });
    (authenticator, calls)
}

/// Authenticator that always fails.
pub fn failing_authenticator() -> FnAuthenticator<String> {
    FnAuthenticator::new(|_identity: &Identity| {
        Err(UpstreamError::Status {
            operation: "login".to_string(),
            status: 401,
        })
    })
}

/// Payload builder producing `count` minimal seed items.
pub struct FixedPayloads {
    pub count: usize,
}

impl PayloadBuilder for FixedPayloads {
    fn build(&self, owner: Option<&IdentityId>) -> Vec<Value> {
        (0..self.count)
            .map(|index| {
                json!({
                    "name": format!("Item {index}"),
                    "created_by": owner.map(IdentityId::as_str),
                    "tags": ["seed", "test"],
                })
            })
            .collect()
    }
}

/// Owner client provider handing out one in-memory backend per owner id.
#[derive(Default)]
pub struct PerOwnerBackends {
    backends: Mutex<Vec<(IdentityId, InMemoryBackend)>>,
    logins: AtomicUsize,
}

impl PerOwnerBackends {
    pub fn backend_for(&self, owner: &IdentityId) -> Option<InMemoryBackend> {
        self.backends
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == owner)
            .map(|(_, backend)| backend.clone())
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

impl OwnerClientProvider for PerOwnerBackends {
    fn client_for(&self, owner: &Identity) -> Result<Arc<dyn DataAccessClient>, UpstreamError> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        let mut backends = self.backends.lock().unwrap();
        let backend = match backends.iter().find(|(id, _)| id == owner.id()) {
            Some((_, backend)) => backend.clone(),
            None => {
                let backend = InMemoryBackend::new();
                backends.push((owner.id().clone(), backend.clone()));
                backend
            }
        };
        Ok(Arc::new(backend))
    }
}

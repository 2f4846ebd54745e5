// crates/fixture-lease-core/src/audit.rs
// ============================================================================
// Module: Fixture Lease Audit Logging
// Description: Structured audit events for leasing, login, and seeding.
// Purpose: Emit JSON-line logs without hard dependencies on a logging stack.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for fixture activity.
//! Events never carry passwords or authentication state; only identity ids,
//! roles, scopes, and counts are recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::IdentityId;
use crate::core::Role;
use crate::core::SeedScope;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit event classification.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureEventKind {
    /// An identity was leased.
    LeaseAcquired,
    /// A leased identity was returned to the pool.
    LeaseReleased,
    /// A lease request found no free identity.
    PoolExhausted,
    /// The login strategy ran for an identity.
    AuthLogin,
    /// Cached authentication state was reused.
    AuthCacheHit,
    /// A scope was already known to be satisfied.
    SeedMemoized,
    /// A scope already held enough records.
    SeedPresent,
    /// Missing seed records were created.
    SeedCreated,
    /// Seed records were deleted and recreated.
    SeedReset,
}

/// Fixture audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureAuditEvent {
    /// Event identifier.
    pub event: FixtureEventKind,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Role involved, when applicable.
    pub role: Option<Role>,
    /// Identity identifier involved, when applicable.
    pub identity_id: Option<String>,
    /// Seed scope label, when applicable.
    pub scope: Option<String>,
    /// Record count (existing total or records created).
    pub count: Option<u64>,
}

impl FixtureAuditEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(event: FixtureEventKind) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis());
        Self {
            event,
            timestamp_ms,
            role: None,
            identity_id: None,
            scope: None,
            count: None,
        }
    }

    /// Attaches the role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Attaches the identity identifier.
    #[must_use]
    pub fn with_identity(mut self, id: &IdentityId) -> Self {
        self.identity_id = Some(id.as_str().to_string());
        self
    }

    /// Attaches the seed scope label.
    #[must_use]
    pub fn with_scope(mut self, scope: &SeedScope) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    /// Attaches a record count.
    #[must_use]
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for fixture events.
pub trait FixtureAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &FixtureAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl FixtureAuditSink for StderrAuditSink {
    fn record(&self, event: &FixtureAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl FixtureAuditSink for FileAuditSink {
    fn record(&self, event: &FixtureAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl FixtureAuditSink for NoopAuditSink {
    fn record(&self, _event: &FixtureAuditEvent) {}
}

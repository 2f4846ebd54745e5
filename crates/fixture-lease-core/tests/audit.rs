// crates/fixture-lease-core/tests/audit.rs
// ============================================================================
// Module: Audit Sink Tests
// Description: JSON-line serialization and file sink behavior.
// Purpose: Ensure audit events are well-formed and never carry secrets.
// Dependencies: fixture-lease-core, serde_json, tempfile
// ============================================================================
//! ## Overview
//! Writes events through the file sink and parses them back as JSON lines.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use fixture_lease_core::FileAuditSink;
use fixture_lease_core::FixtureAuditEvent;
use fixture_lease_core::FixtureAuditSink;
use fixture_lease_core::FixtureEventKind;
use fixture_lease_core::Identity;
use fixture_lease_core::IdentityId;
use fixture_lease_core::IdentityPool;
use fixture_lease_core::Role;
use fixture_lease_core::SeedScope;
use serde_json::Value;

#[test]
fn event_serializes_with_snake_case_labels() {
    let event = FixtureAuditEvent::new(FixtureEventKind::SeedCreated)
        .with_role(Role::Editor)
        .with_identity(&IdentityId::new("e1"))
        .with_scope(&SeedScope::Owner(IdentityId::new("e1")))
        .with_count(31);

    let value = serde_json::to_value(&event).unwrap();

    assert_eq!(value["event"], "seed_created");
    assert_eq!(value["role"], "EDITOR");
    assert_eq!(value["identity_id"], "e1");
    assert_eq!(value["scope"], "owner:e1");
    assert_eq!(value["count"], 31);
    assert!(value["timestamp_ms"].as_u64().unwrap() > 0);
}

#[test]
fn file_sink_appends_json_lines_without_passwords() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let sink = Arc::new(FileAuditSink::new(&path).unwrap());
    let pool = IdentityPool::with_audit(
        vec![Identity::new("a1", "a1@test.com", "super-secret", Role::Admin)],
        sink,
    )
    .unwrap();

    let admin = pool.acquire(Role::Admin).unwrap();
    pool.release(&admin);

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> =
        contents.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "lease_acquired");
    assert_eq!(lines[1]["event"], "lease_released");
    assert!(!contents.contains("super-secret"));
}

#[test]
fn file_sink_appends_to_existing_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    std::fs::write(&path, "{\"event\":\"earlier\"}\n").unwrap();

    let sink = FileAuditSink::new(&path).unwrap();
    sink.record(&FixtureAuditEvent::new(FixtureEventKind::AuthLogin));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
    assert!(contents.starts_with("{\"event\":\"earlier\"}"));
}

#[test]
fn identity_debug_redacts_password() {
    let identity = Identity::new("a1", "a1@test.com", "super-secret", Role::Admin);

    let rendered = format!("{identity:?}");

    assert!(rendered.contains("a1@test.com"));
    assert!(!rendered.contains("super-secret"));
}

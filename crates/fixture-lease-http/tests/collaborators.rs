// crates/fixture-lease-http/tests/collaborators.rs
// ============================================================================
// Module: HTTP Collaborator Tests
// Description: Request shape and error mapping for the HTTP collaborators.
// Purpose: Validate count, create, login, and cleanup against a live server.
// ============================================================================

//! ## Overview
//! Each test runs a recording `tiny_http` server and checks both the request
//! the collaborator sent and how it interpreted the response. Non-success
//! statuses must surface as errors, never as empty results.

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

mod common;

use std::time::Duration;

use fixture_lease_core::Authenticator;
use fixture_lease_core::DataAccessClient;
use fixture_lease_core::Identity;
use fixture_lease_core::IdentityId;
use fixture_lease_core::ItemFilter;
use fixture_lease_core::OwnerClientProvider;
use fixture_lease_core::Role;
use fixture_lease_core::SeedCleaner;
use fixture_lease_core::UpstreamError;
use fixture_lease_http::ApiClient;
use fixture_lease_http::ApiClientProvider;
use fixture_lease_http::ApiLogin;
use fixture_lease_http::BearerToken;
use fixture_lease_http::Endpoint;
use fixture_lease_http::HttpSeedCleaner;
use serde_json::json;

use crate::common::MockBackend;

fn endpoint(base_url: &str) -> Endpoint {
    Endpoint::new(base_url, Duration::from_secs(5)).expect("endpoint")
}

fn token(value: &str) -> BearerToken {
    BearerToken::new(value).expect("token")
}

fn editor() -> Identity {
    Identity::new("editor_1", "editor1@test.com", "editor-pw", Role::Editor)
}

// ============================================================================
// SECTION: Count
// ============================================================================

#[test]
fn count_sends_owner_filter_limit_and_bearer() {
    let backend = MockBackend::fixed(1, 200, r#"{"data":[],"pagination":{"total":7}}"#);
    let client = ApiClient::new(endpoint(&backend.base_url), "/items", token("tok-1"));
    let filter = ItemFilter {
        created_by: Some(IdentityId::new("editor_1")),
    };

    let total = client.count(&filter).expect("count");
    let requests = backend.finish();

    assert_eq!(total, 7);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "/items?created_by=editor_1&limit=1");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer tok-1"));
}

#[test]
fn global_count_has_no_owner_filter() {
    let backend = MockBackend::fixed(1, 200, r#"{"pagination":{"total":31}}"#);
    let client = ApiClient::new(endpoint(&backend.base_url), "/items", token("tok"));

    assert_eq!(client.count(&ItemFilter::default()).expect("count"), 31);
    assert_eq!(backend.finish()[0].url, "/items?limit=1");
}

#[test]
fn count_without_pagination_total_is_decode_error() {
    let backend = MockBackend::fixed(1, 200, r#"{"data":[]}"#);
    let client = ApiClient::new(endpoint(&backend.base_url), "/items", token("tok"));

    let err = client.count(&ItemFilter::default()).expect_err("missing total");
    backend.finish();
    assert!(matches!(err, UpstreamError::Decode(message) if message.contains("pagination.total")));
}

#[test]
fn count_server_error_surfaces_status() {
    let backend = MockBackend::fixed(1, 500, r#"{"error":"boom"}"#);
    let client = ApiClient::new(endpoint(&backend.base_url), "/items", token("tok"));

    let err = client.count(&ItemFilter::default()).expect_err("server error");
    backend.finish();
    assert_eq!(
        err,
        UpstreamError::Status {
            operation: "count items".to_string(),
            status: 500,
        }
    );
}

#[test]
fn redirect_status_is_an_error() {
    let backend = MockBackend::fixed(1, 302, "{}");
    let client = ApiClient::new(endpoint(&backend.base_url), "/items", token("tok"));

    let err = client.count(&ItemFilter::default()).expect_err("redirect");
    assert_eq!(backend.finish().len(), 1);
    assert!(matches!(err, UpstreamError::Status { status: 302, .. }));
}

// ============================================================================
// SECTION: Create
// ============================================================================

#[test]
fn create_posts_json_payload_and_returns_resource() {
    let backend = MockBackend::serve(1, |request| {
        let mut created = request.json();
        created["_id"] = json!("item-1");
        (201, created.to_string())
    });
    let client = ApiClient::new(endpoint(&backend.base_url), "/items", token("tok"));
    let payload = json!({"name": "Item 0", "tags": ["seed", "baseline"]});

    let created = client.create(&payload).expect("create");
    let requests = backend.finish();

    assert_eq!(created["_id"], "item-1");
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "/items");
    assert_eq!(requests[0].json(), payload);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer tok"));
}

#[test]
fn create_rejection_surfaces_status() {
    let backend = MockBackend::fixed(1, 422, r#"{"error":"invalid"}"#);
    let client = ApiClient::new(endpoint(&backend.base_url), "/items", token("tok"));

    let err = client.create(&json!({})).expect_err("rejected");
    backend.finish();
    assert_eq!(
        err,
        UpstreamError::Status {
            operation: "create item".to_string(),
            status: 422,
        }
    );
}

// ============================================================================
// SECTION: Login
// ============================================================================

#[test]
fn login_posts_credentials_and_reads_token() {
    let backend = MockBackend::fixed(1, 200, r#"{"token":"jwt-editor"}"#);
    let login = ApiLogin::new(endpoint(&backend.base_url), "/auth/login");

    let state = login.authenticate(&editor()).expect("login");
    let requests = backend.finish();

    assert_eq!(state.expose(), "jwt-editor");
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "/auth/login");
    assert_eq!(requests[0].json(), json!({"email": "editor1@test.com", "password": "editor-pw"}));
    assert!(requests[0].authorization.is_none());
}

#[test]
fn login_without_token_is_rejected() {
    let backend = MockBackend::fixed(1, 200, r#"{"user":{"id":"editor_1"}}"#);
    let login = ApiLogin::new(endpoint(&backend.base_url), "/auth/login");

    let err = login.authenticate(&editor()).expect_err("no token");
    backend.finish();
    assert!(matches!(err, UpstreamError::Rejected(message) if message.contains("editor_1")));
}

#[test]
fn login_failure_surfaces_status() {
    let backend = MockBackend::fixed(1, 401, r#"{"error":"bad credentials"}"#);
    let login = ApiLogin::new(endpoint(&backend.base_url), "/auth/login");

    let err = login.authenticate(&editor()).expect_err("unauthorized");
    backend.finish();
    assert_eq!(
        err,
        UpstreamError::Status {
            operation: "login".to_string(),
            status: 401,
        }
    );
}

#[test]
fn bearer_token_debug_is_redacted() {
    let rendered = format!("{:?}", token("secret-jwt"));
    assert!(!rendered.contains("secret-jwt"));
    assert!(BearerToken::new("  ").is_err());
}

// ============================================================================
// SECTION: Owner Clients
// ============================================================================

#[test]
fn provider_logs_in_as_owner_and_counts_with_owner_token() {
    let backend = MockBackend::serve(2, |request| {
        if request.url == "/auth/login" {
            (200, r#"{"token":"owner-token"}"#.to_string())
        } else {
            (200, r#"{"pagination":{"total":2}}"#.to_string())
        }
    });
    let provider = ApiClientProvider::new(
        ApiLogin::new(endpoint(&backend.base_url), "/auth/login"),
        "/items",
    );

    let client = provider.client_for(&editor()).expect("owner client");
    let filter = ItemFilter {
        created_by: Some(IdentityId::new("editor_1")),
    };
    assert_eq!(client.count(&filter).expect("count"), 2);

    let requests = backend.finish();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer owner-token"));
}

// ============================================================================
// SECTION: Cleanup
// ============================================================================

#[test]
fn cleaner_deletes_by_seed_tag_and_owner() {
    let backend = MockBackend::fixed(2, 204, "");
    let cleaner =
        HttpSeedCleaner::new(endpoint(&backend.base_url), "/test-support/items", token("admin"));

    cleaner.delete_all_seed_records().expect("delete all");
    cleaner.delete_seed_records_for_owner(&IdentityId::new("editor_1")).expect("delete owner");
    let requests = backend.finish();

    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].url, "/test-support/items?tag=seed");
    assert_eq!(requests[1].url, "/test-support/items?tag=seed&created_by=editor_1");
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer admin"));
}

#[test]
fn cleaner_failure_surfaces_status() {
    let backend = MockBackend::fixed(1, 403, "{}");
    let cleaner =
        HttpSeedCleaner::new(endpoint(&backend.base_url), "/test-support/items", token("admin"));

    let err = cleaner.delete_all_seed_records().expect_err("forbidden");
    backend.finish();
    assert!(matches!(err, UpstreamError::Status { status: 403, .. }));
}

// crates/fixture-lease-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Starting point for new suites and a fixture for config tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The example is static and must always pass validation once the referenced
//! password variables are set.

/// Returns a canonical example `fixture-lease.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[backend]
base_url = "http://127.0.0.1:4000"
login_path = "/auth/login"
timeout_ms = 10000

[frontend]
base_url = "http://127.0.0.1:3000"

[seed]
collection = "/items"
cleanup_path = "/test-support/items"
reset = false
global_required = 31
owner_required = 5
payload_count = 31
batch_tag = "baseline"
admin_identity = "admin_1"

[audit]
sink = "stderr"

[[identities]]
id = "admin_1"
email = "admin1@test.com"
password_env = "FIXTURE_ADMIN_1_PASSWORD"
role = "ADMIN"

[[identities]]
id = "admin_2"
email = "admin2@test.com"
password_env = "FIXTURE_ADMIN_2_PASSWORD"
role = "ADMIN"

[[identities]]
id = "editor_1"
email = "editor1@test.com"
password_env = "FIXTURE_EDITOR_1_PASSWORD"
role = "EDITOR"

[[identities]]
id = "viewer_1"
email = "viewer1@test.com"
password_env = "FIXTURE_VIEWER_1_PASSWORD"
role = "VIEWER"
"#,
    )
}

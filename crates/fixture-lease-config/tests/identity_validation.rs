//! Identity pool validation tests for fixture-lease-config.
// crates/fixture-lease-config/tests/identity_validation.rs
// =============================================================================
// Module: Identity Validation Tests
// Description: Validate identity entries and password resolution.
// Purpose: Ensure the pool definition fails closed on ambiguous entries.
// =============================================================================

#![allow(clippy::use_debug, reason = "Redaction test inspects Debug output.")]

use std::collections::BTreeMap;

use fixture_lease_config::ConfigError;
use fixture_lease_config::FixtureLeaseConfig;
use fixture_lease_core::Role;

type TestResult = Result<(), String>;

fn parse_and_validate(contents: &str) -> Result<FixtureLeaseConfig, ConfigError> {
    let config = FixtureLeaseConfig::from_toml_str(contents)?;
    config.validate()?;
    Ok(config)
}

fn assert_invalid(result: Result<FixtureLeaseConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

fn identity_block(id: &str, email: &str, role: &str) -> String {
    format!(
        "[[identities]]\nid = \"{id}\"\nemail = \"{email}\"\n\
         password = \"pw\"\nrole = \"{role}\"\n\n"
    )
}

#[test]
fn duplicate_id_within_role_is_rejected() -> TestResult {
    let contents = identity_block("a1", "one@test.com", "ADMIN")
        + &identity_block("a1", "two@test.com", "ADMIN");
    assert_invalid(parse_and_validate(&contents), "duplicate identity id a1 for role ADMIN")
}

#[test]
fn same_id_across_roles_is_accepted() -> TestResult {
    let contents = identity_block("u1", "admin@test.com", "ADMIN")
        + &identity_block("u1", "viewer@test.com", "VIEWER");
    parse_and_validate(&contents).map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn reused_email_is_rejected() -> TestResult {
    let contents = identity_block("a1", "shared@test.com", "ADMIN")
        + &identity_block("v1", "shared@test.com", "VIEWER");
    assert_invalid(
        parse_and_validate(&contents),
        "identity email shared@test.com is used more than once",
    )
}

#[test]
fn missing_admin_is_rejected() -> TestResult {
    let contents = identity_block("v1", "v1@test.com", "VIEWER");
    assert_invalid(parse_and_validate(&contents), "at least one ADMIN identity is required")
}

#[test]
fn admin_identity_must_name_an_admin() -> TestResult {
    let contents = String::from("[seed]\nadmin_identity = \"v1\"\n\n")
        + &identity_block("a1", "a1@test.com", "ADMIN")
        + &identity_block("v1", "v1@test.com", "VIEWER");
    assert_invalid(
        parse_and_validate(&contents),
        "seed.admin_identity v1 does not name an ADMIN identity",
    )
}

#[test]
fn both_password_sources_are_rejected() -> TestResult {
    let contents = r#"
[[identities]]
id = "a1"
email = "a1@test.com"
password = "pw"
password_env = "A1_PASSWORD"
role = "ADMIN"
"#;
    assert_invalid(parse_and_validate(contents), "requires exactly one of password or password_env")
}

#[test]
fn missing_password_source_is_rejected() -> TestResult {
    let contents = r#"
[[identities]]
id = "a1"
email = "a1@test.com"
role = "ADMIN"
"#;
    assert_invalid(parse_and_validate(contents), "requires exactly one of password or password_env")
}

#[test]
fn email_without_at_sign_is_rejected() -> TestResult {
    let contents = identity_block("a1", "not-an-email", "ADMIN");
    assert_invalid(parse_and_validate(&contents), "identity a1 email must contain '@'")
}

#[test]
fn password_env_is_resolved_from_environment() -> TestResult {
    let contents = r#"
[[identities]]
id = "e1"
email = "e1@test.com"
password_env = "E1_PASSWORD"
role = "EDITOR"

[[identities]]
id = "a1"
email = "a1@test.com"
password = "inline"
role = "ADMIN"
"#;
    let config = parse_and_validate(contents).map_err(|err| err.to_string())?;
    let env = BTreeMap::from([("E1_PASSWORD".to_string(), "from-env".to_string())]);
    let identities = config.resolve_identities_with(&env).map_err(|err| err.to_string())?;

    let editor = identities.first().ok_or("missing editor")?;
    if editor.password() != "from-env" || editor.role() != Role::Editor {
        return Err("editor password not resolved from env".to_string());
    }
    let admin = identities.get(1).ok_or("missing admin")?;
    if admin.password() != "inline" {
        return Err("admin inline password not kept".to_string());
    }
    Ok(())
}

#[test]
fn missing_password_env_fails_resolution() -> TestResult {
    let contents = r#"
[[identities]]
id = "a1"
email = "a1@test.com"
password_env = "A1_PASSWORD"
role = "ADMIN"
"#;
    let config = parse_and_validate(contents).map_err(|err| err.to_string())?;
    match config.resolve_identities_with(&BTreeMap::new()) {
        Err(ConfigError::Env(message)) if message.contains("A1_PASSWORD") => Ok(()),
        Err(other) => Err(format!("unexpected error {other}")),
        Ok(_) => Err("expected missing password env to fail".to_string()),
    }
}

#[test]
fn identity_config_debug_redacts_inline_password() -> TestResult {
    let config = parse_and_validate(&identity_block("a1", "a1@test.com", "ADMIN"))
        .map_err(|err| err.to_string())?;
    let rendered = format!("{:?}", config.identities);
    if rendered.contains("\"pw\"") {
        return Err(format!("password leaked in debug output: {rendered}"));
    }
    Ok(())
}

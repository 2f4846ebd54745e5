// crates/fixture-lease-config/src/env.rs
// ============================================================================
// Module: Fixture Lease Environment
// Description: Environment variable names and strict value parsing.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 and empty values fail closed.
//!
//! Lookups go through [`EnvSource`] so loaders can be exercised without
//! mutating the process environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::ffi::OsString;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys recognized by the config loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureLeaseEnv {
    /// Config file path override.
    ConfigPath,
    /// Backend base URL override.
    BackendUrl,
    /// Frontend base URL override.
    FrontendUrl,
    /// Seed reset flag (`true`/`false` or `1`/`0`).
    SeedReset,
    /// Audit log file path; switches the audit sink to file output.
    AuditLog,
}

impl FixtureLeaseEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "FIXTURE_LEASE_CONFIG",
            Self::BackendUrl => "FIXTURE_LEASE_BACKEND_URL",
            Self::FrontendUrl => "FIXTURE_LEASE_FRONTEND_URL",
            Self::SeedReset => "FIXTURE_LEASE_SEED_RESET",
            Self::AuditLog => "FIXTURE_LEASE_AUDIT_LOG",
        }
    }
}

// ============================================================================
// SECTION: Sources
// ============================================================================

/// Source of environment variables.
pub trait EnvSource {
    /// Returns the raw value of a variable when set.
    fn var_os(&self, name: &str) -> Option<OsString>;
}

/// The current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var_os(&self, name: &str) -> Option<OsString> {
        std::env::var_os(name)
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var_os(&self, name: &str) -> Option<OsString> {
        self.get(name).map(OsString::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::Env`] when the value is not valid UTF-8.
pub fn read_env_strict(env: &dyn EnvSource, name: &str) -> Result<Option<String>, ConfigError> {
    env.var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Env(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns [`ConfigError::Env`] when the variable is set but empty or
/// whitespace, or is not valid UTF-8.
pub fn read_env_nonempty(env: &dyn EnvSource, name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(env, name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Env(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a boolean environment value.
///
/// # Errors
///
/// Returns [`ConfigError::Env`] when the value is not `true`, `false`, `1`,
/// or `0`.
pub fn parse_bool_env(name: &str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(Some(true)),
        "false" | "0" => Ok(Some(false)),
        _ => Err(ConfigError::Env(format!("{name} must be true/false or 1/0"))),
    }
}

// crates/fixture-lease-config/src/config.rs
// ============================================================================
// Module: Fixture Lease Configuration
// Description: Configuration loading and validation for fixture leasing.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: fixture-lease-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with a strict size limit, then
//! environment overrides are applied, then the result is validated. Missing or
//! invalid configuration fails closed.
//!
//! Passwords should be supplied through `password_env`; they are read only
//! when identities are resolved and never appear in `Debug` output of the
//! resolved [`Identity`] values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fixture_lease_core::DEFAULT_GLOBAL_REQUIRED;
use fixture_lease_core::DEFAULT_OWNER_REQUIRED;
use fixture_lease_core::FileAuditSink;
use fixture_lease_core::FixtureAuditSink;
use fixture_lease_core::Identity;
use fixture_lease_core::NoopAuditSink;
use fixture_lease_core::Role;
use fixture_lease_core::SeedThresholds;
use fixture_lease_core::StderrAuditSink;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::env::EnvSource;
use crate::env::FixtureLeaseEnv;
use crate::env::ProcessEnv;
use crate::env::parse_bool_env;
use crate::env::read_env_nonempty;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "fixture-lease.toml";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured identities.
pub(crate) const MAX_IDENTITIES: usize = 256;

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level fixture lease configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureLeaseConfig {
    /// Backend API settings.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Frontend settings consumed by UI login strategies.
    #[serde(default)]
    pub frontend: FrontendConfig,
    /// Seed thresholds, payload shape, and reset behavior.
    #[serde(default)]
    pub seed: SeedConfig,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Identity pool entries in lease preference order.
    #[serde(default)]
    pub identities: Vec<IdentityConfig>,
}

impl FixtureLeaseConfig {
    /// Loads configuration from disk using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overrides, or validation fail.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, &ProcessEnv)
    }

    /// Loads configuration from disk using an explicit environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overrides, or validation fail.
    pub fn load_with_env(path: Option<&Path>, env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path, env)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.apply_env_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML without overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies `FIXTURE_LEASE_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when an override is empty, not UTF-8, or
    /// malformed.
    pub fn apply_env_overrides(&mut self, env: &dyn EnvSource) -> Result<(), ConfigError> {
        if let Some(url) = read_env_nonempty(env, FixtureLeaseEnv::BackendUrl.as_str())? {
            self.backend.base_url = url;
        }
        if let Some(url) = read_env_nonempty(env, FixtureLeaseEnv::FrontendUrl.as_str())? {
            self.frontend.base_url = url;
        }
        let reset = read_env_nonempty(env, FixtureLeaseEnv::SeedReset.as_str())?;
        if let Some(reset) = parse_bool_env(FixtureLeaseEnv::SeedReset.as_str(), reset)? {
            self.seed.reset = reset;
        }
        if let Some(path) = read_env_nonempty(env, FixtureLeaseEnv::AuditLog.as_str())? {
            self.audit.sink = AuditSinkKind::File;
            self.audit.path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.frontend.validate()?;
        self.seed.validate()?;
        self.audit.validate()?;
        self.validate_identities()
    }

    /// Validates the identity pool definition.
    fn validate_identities(&self) -> Result<(), ConfigError> {
        if self.identities.len() > MAX_IDENTITIES {
            return Err(ConfigError::Invalid(format!(
                "identities exceeds max entries ({MAX_IDENTITIES})"
            )));
        }
        let mut ids: BTreeMap<Role, BTreeSet<&str>> = BTreeMap::new();
        let mut emails: BTreeSet<&str> = BTreeSet::new();
        for identity in &self.identities {
            identity.validate()?;
            if !ids.entry(identity.role).or_default().insert(identity.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate identity id {} for role {}",
                    identity.id, identity.role
                )));
            }
            if !emails.insert(identity.email.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "identity email {} is used more than once",
                    identity.email
                )));
            }
        }
        match &self.seed.admin_identity {
            Some(admin) => {
                let found = self
                    .identities
                    .iter()
                    .any(|identity| identity.role == Role::Admin && &identity.id == admin);
                if !found {
                    return Err(ConfigError::Invalid(format!(
                        "seed.admin_identity {admin} does not name an ADMIN identity"
                    )));
                }
            }
            None => {
                if !self.identities.iter().any(|identity| identity.role == Role::Admin) {
                    return Err(ConfigError::Invalid(
                        "at least one ADMIN identity is required for seeding".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Materializes identities using the process environment for passwords.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a password variable is missing.
    pub fn resolve_identities(&self) -> Result<Vec<Identity>, ConfigError> {
        self.resolve_identities_with(&ProcessEnv)
    }

    /// Materializes identities using an explicit environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a password variable is missing.
    pub fn resolve_identities_with(
        &self,
        env: &dyn EnvSource,
    ) -> Result<Vec<Identity>, ConfigError> {
        self.identities.iter().map(|identity| identity.resolve(env)).collect()
    }

    /// Returns the identity entry used for the admin API client.
    #[must_use]
    pub fn admin_identity(&self) -> Option<&IdentityConfig> {
        match &self.seed.admin_identity {
            Some(admin) => self
                .identities
                .iter()
                .find(|identity| identity.role == Role::Admin && &identity.id == admin),
            None => self.identities.iter().find(|identity| identity.role == Role::Admin),
        }
    }

    /// Returns the configured seed thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> SeedThresholds {
        SeedThresholds {
            global: self.seed.global_required,
            per_owner: self.seed.owner_required,
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit log cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn FixtureAuditSink>, ConfigError> {
        match (self.audit.sink, &self.audit.path) {
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(path)
                    .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for file sink".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// Backend API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the backend API.
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Path of the login endpoint.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            login_path: default_login_path(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl BackendConfig {
    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates backend settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("backend.base_url", &self.base_url)?;
        validate_api_path("backend.login_path", &self.login_path)?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "backend.timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Frontend
// ============================================================================

/// Frontend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrontendConfig {
    /// Base URL of the frontend under test.
    #[serde(default = "default_frontend_url")]
    pub base_url: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            base_url: default_frontend_url(),
        }
    }
}

impl FrontendConfig {
    /// Validates frontend settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("frontend.base_url", &self.base_url)
    }
}

// ============================================================================
// SECTION: Seed
// ============================================================================

/// Seed settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    /// Collection path used for counts and creates.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Test-support path used for destructive cleanup.
    #[serde(default = "default_cleanup_path")]
    pub cleanup_path: String,
    /// Delete and recreate seed data on every ensure.
    #[serde(default)]
    pub reset: bool,
    /// Required record count in the global scope.
    #[serde(default = "default_global_required")]
    pub global_required: u64,
    /// Required record count per owner.
    #[serde(default = "default_owner_required")]
    pub owner_required: u64,
    /// Items created per missing scope.
    #[serde(default = "default_payload_count")]
    pub payload_count: u64,
    /// Secondary tag attached to created items.
    #[serde(default = "default_batch_tag")]
    pub batch_tag: String,
    /// ADMIN identity used for global seeding; defaults to the first ADMIN.
    #[serde(default)]
    pub admin_identity: Option<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            cleanup_path: default_cleanup_path(),
            reset: false,
            global_required: default_global_required(),
            owner_required: default_owner_required(),
            payload_count: default_payload_count(),
            batch_tag: default_batch_tag(),
            admin_identity: None,
        }
    }
}

impl SeedConfig {
    /// Validates seed settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_api_path("seed.collection", &self.collection)?;
        validate_api_path("seed.cleanup_path", &self.cleanup_path)?;
        for (field, value) in [
            ("seed.global_required", self.global_required),
            ("seed.owner_required", self.owner_required),
            ("seed.payload_count", self.payload_count),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
            }
        }
        let required = self.global_required.max(self.owner_required);
        if self.payload_count < required {
            return Err(ConfigError::Invalid(format!(
                "seed.payload_count ({}) must be at least the largest required count ({required})",
                self.payload_count
            )));
        }
        if self.batch_tag.trim().is_empty() {
            return Err(ConfigError::Invalid("seed.batch_tag must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
    /// Audit disabled.
    None,
}

/// Audit settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.sink != AuditSinkKind::File {
            return Ok(());
        }
        let Some(path) = &self.path else {
            return Err(ConfigError::Invalid("audit.path is required for file sink".to_string()));
        };
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("audit.path must be non-empty".to_string()));
        }
        if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("audit.path exceeds max length".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Identities
// ============================================================================

/// Identity pool entry.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Identifier unique within the role.
    pub id: String,
    /// Login email, unique across the pool.
    pub email: String,
    /// Inline password (prefer `password_env`).
    #[serde(default)]
    pub password: Option<String>,
    /// Environment variable holding the password.
    #[serde(default)]
    pub password_env: Option<String>,
    /// Role the identity belongs to.
    pub role: Role,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("password_env", &self.password_env)
            .field("role", &self.role)
            .finish()
    }
}

impl IdentityConfig {
    /// Validates the entry.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::Invalid("identity id must be non-empty".to_string()));
        }
        if !self.email.contains('@') {
            return Err(ConfigError::Invalid(format!(
                "identity {} email must contain '@'",
                self.id
            )));
        }
        match (&self.password, &self.password_env) {
            (Some(_), None) => Ok(()),
            (None, Some(name)) if !name.trim().is_empty() => Ok(()),
            (None, Some(_)) => Err(ConfigError::Invalid(format!(
                "identity {} password_env must be non-empty",
                self.id
            ))),
            _ => Err(ConfigError::Invalid(format!(
                "identity {} requires exactly one of password or password_env",
                self.id
            ))),
        }
    }

    /// Resolves the password and builds the runtime identity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when the password variable is missing or
    /// empty, or [`ConfigError::Invalid`] when no password source is set.
    pub fn resolve(&self, env: &dyn EnvSource) -> Result<Identity, ConfigError> {
        let password = match (&self.password, &self.password_env) {
            (Some(password), _) => password.clone(),
            (None, Some(name)) => read_env_nonempty(env, name)?.ok_or_else(|| {
                ConfigError::Env(format!("{name} is not set for identity {}", self.id))
            })?,
            (None, None) => {
                return Err(ConfigError::Invalid(format!(
                    "identity {} has no password source",
                    self.id
                )));
            }
        };
        Ok(Identity::new(self.id.as_str(), self.email.as_str(), password, self.role))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Invalid or missing environment value.
    #[error("config env error: {0}")]
    Env(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>, env: &dyn EnvSource) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = read_env_nonempty(env, FixtureLeaseEnv::ConfigPath.as_str())? {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates an absolute `http`/`https` URL with a host.
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{field} must use http:// or https://")));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::Invalid(format!("{field} must include a host")));
    }
    Ok(())
}

/// Validates an API path that is joined onto the backend base URL.
fn validate_api_path(field: &str, value: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::Invalid(format!("{field} must start with '/'")));
    }
    if value.contains('?') || value.contains('#') {
        return Err(ConfigError::Invalid(format!("{field} must not contain a query or fragment")));
    }
    Ok(())
}

/// Default backend base URL.
fn default_backend_url() -> String {
    "http://127.0.0.1:4000".to_string()
}

/// Default login path.
fn default_login_path() -> String {
    "/auth/login".to_string()
}

/// Default per-request timeout.
const fn default_timeout_ms() -> u64 {
    10_000
}

/// Default frontend base URL.
fn default_frontend_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

/// Default item collection path.
fn default_collection() -> String {
    "/items".to_string()
}

/// Default cleanup path.
fn default_cleanup_path() -> String {
    "/test-support/items".to_string()
}

/// Default global threshold.
const fn default_global_required() -> u64 {
    DEFAULT_GLOBAL_REQUIRED
}

/// Default per-owner threshold.
const fn default_owner_required() -> u64 {
    DEFAULT_OWNER_REQUIRED
}

/// Default payload batch size.
const fn default_payload_count() -> u64 {
    DEFAULT_GLOBAL_REQUIRED
}

/// Default batch tag.
fn default_batch_tag() -> String {
    "baseline".to_string()
}

// crates/fixture-lease-cli/src/main.rs
// ============================================================================
// Module: Fixture Lease CLI Entry Point
// Description: Command dispatcher for config checks, pool listing, and seeding.
// Purpose: Prepare and inspect fixture state before an end-to-end suite runs.
// Dependencies: clap, fixture-lease-config, fixture-lease-core, fixture-lease-http
// ============================================================================

//! ## Overview
//! `fixture-lease` validates configuration, lists the identity pool without
//! credentials, and runs the seed plan for a role against the configured
//! backend. Errors are written to stderr and turn into a failure exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use fixture_lease_config::FixtureLeaseConfig;
use fixture_lease_config::IdentityConfig;
use fixture_lease_config::config_toml_example;
use fixture_lease_core::Identity;
use fixture_lease_core::Role;
use fixture_lease_core::SeedOutcome;
use fixture_lease_core::SeedReport;
use fixture_lease_http::resolve_admin;
use fixture_lease_http::seed_orchestrator;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "fixture-lease", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Identity pool utilities.
    Pool {
        /// Selected pool subcommand.
        #[command(subcommand)]
        command: PoolCommand,
    },
    /// Ensure seed data for a role against the configured backend.
    Seed(SeedCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file and resolve its credentials.
    Check(ConfigArgs),
    /// Print an example configuration file.
    Example,
}

/// Pool subcommands.
#[derive(Subcommand, Debug)]
enum PoolCommand {
    /// List configured identities per role.
    List(PoolListCommand),
}

/// Config file selection shared by commands.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to fixture-lease.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Output formats for structured commands.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// JSON output.
    Json,
    /// Human-readable text output.
    Text,
}

/// Arguments for `pool list`.
#[derive(Args, Debug)]
struct PoolListCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `seed`.
#[derive(Args, Debug)]
struct SeedCommand {
    /// Role whose seed plan is applied (`ADMIN`, `EDITOR`, `VIEWER`).
    #[arg(long, value_name = "ROLE")]
    role: String,
    /// Identity to seed for; defaults to the first identity of the role.
    #[arg(long, value_name = "ID")]
    identity: Option<String>,
    /// Delete and recreate seed records regardless of existing data.
    #[arg(long, action = ArgAction::SetTrue)]
    reset: bool,
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        write_stdout(&format!("fixture-lease {}", env!("CARGO_PKG_VERSION")))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Pool {
            command: PoolCommand::List(command),
        } => command_pool_list(&command),
        Commands::Seed(command) => command_seed(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error(&err)))?;
    write_stdout("")
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Check(args) => {
            let config = load_config(&args)?;
            config
                .resolve_identities()
                .map_err(|err| CliError::new(format!("credential resolution failed: {err}")))?;
            write_stdout(&render_config_summary(&config))?;
        }
        ConfigCommand::Example => write_stdout(config_toml_example().trim_end())?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders the summary printed by `config check`.
fn render_config_summary(config: &FixtureLeaseConfig) -> String {
    let mut output = String::from("config ok\n");
    let _ = writeln!(output, "backend: {}", config.backend.base_url);
    let _ = writeln!(
        output,
        "seed: collection={} global_required={} owner_required={} payload_count={} reset={}",
        config.seed.collection,
        config.seed.global_required,
        config.seed.owner_required,
        config.seed.payload_count,
        config.seed.reset
    );
    let counts: Vec<String> = Role::ALL
        .into_iter()
        .map(|role| {
            let count = config.identities.iter().filter(|entry| entry.role == role).count();
            format!("{role}={count}")
        })
        .collect();
    let _ = write!(output, "identities: {}", counts.join(" "));
    output
}

// ============================================================================
// SECTION: Pool Commands
// ============================================================================

/// Pool listing grouped by role.
#[derive(Debug, Serialize)]
struct PoolListOutput {
    /// Roles in marker resolution order.
    roles: Vec<PoolRoleOutput>,
}

/// Identities configured for one role.
#[derive(Debug, Serialize)]
struct PoolRoleOutput {
    /// Role label.
    role: Role,
    /// Identities in lease preference order.
    identities: Vec<PoolIdentityOutput>,
}

/// Credential-free view of an identity.
#[derive(Debug, Serialize)]
struct PoolIdentityOutput {
    /// Identity id.
    id: String,
    /// Login email.
    email: String,
    /// Where the password comes from (`inline` or `env:NAME`).
    password_source: String,
}

/// Executes `pool list`.
fn command_pool_list(command: &PoolListCommand) -> CliResult<ExitCode> {
    let config = load_config(&command.config)?;
    let output = pool_output(&config.identities);
    match command.format {
        OutputFormat::Json => write_json(&output)?,
        OutputFormat::Text => write_stdout(&render_pool_text(&output))?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Groups identity entries by role without exposing passwords.
fn pool_output(identities: &[IdentityConfig]) -> PoolListOutput {
    let roles = Role::ALL
        .into_iter()
        .map(|role| PoolRoleOutput {
            role,
            identities: identities
                .iter()
                .filter(|entry| entry.role == role)
                .map(|entry| PoolIdentityOutput {
                    id: entry.id.clone(),
                    email: entry.email.clone(),
                    password_source: entry
                        .password_env
                        .as_ref()
                        .map_or_else(|| "inline".to_string(), |name| format!("env:{name}")),
                })
                .collect(),
        })
        .collect();
    PoolListOutput {
        roles,
    }
}

/// Renders the pool listing as text.
fn render_pool_text(output: &PoolListOutput) -> String {
    let mut text = String::new();
    for role in &output.roles {
        let _ = writeln!(text, "{} ({})", role.role, role.identities.len());
        for identity in &role.identities {
            let _ = writeln!(
                text,
                "  {} {} [{}]",
                identity.id, identity.email, identity.password_source
            );
        }
    }
    text.trim_end().to_string()
}

// ============================================================================
// SECTION: Seed Command
// ============================================================================

/// Executes `seed`.
fn command_seed(command: &SeedCommand) -> CliResult<ExitCode> {
    let mut config = load_config(&command.config)?;
    if command.reset {
        config.seed.reset = true;
    }
    let role = Role::from_str(&command.role).map_err(|err| CliError::new(err.to_string()))?;
    let identities = config
        .resolve_identities()
        .map_err(|err| CliError::new(format!("credential resolution failed: {err}")))?;
    let identity = select_identity(&identities, role, command.identity.as_deref())?;
    let admin =
        resolve_admin(&config, &identities).map_err(|err| CliError::new(err.to_string()))?;
    let audit = config
        .audit_sink()
        .map_err(|err| CliError::new(format!("audit sink setup failed: {err}")))?;
    let orchestrator = seed_orchestrator(&config, admin, audit)
        .map_err(|err| CliError::new(format!("seed setup failed: {err}")))?;
    let report = orchestrator
        .ensure_role(&command.role, identity)
        .map_err(|err| CliError::new(format!("seed failed: {err}")))?;
    match command.format {
        OutputFormat::Json => write_json(&report)?,
        OutputFormat::Text => write_stdout(&render_seed_text(&report))?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Picks the identity named by `id`, or the first identity of the role.
fn select_identity<'a>(
    identities: &'a [Identity],
    role: Role,
    id: Option<&str>,
) -> CliResult<&'a Identity> {
    let mut candidates = identities.iter().filter(|identity| identity.role() == role);
    let selected = match id {
        Some(id) => candidates.find(|identity| identity.id().as_str() == id),
        None => candidates.next(),
    };
    selected.ok_or_else(|| {
        CliError::new(id.map_or_else(
            || format!("no {role} identity is configured"),
            |id| format!("no {role} identity with id {id}"),
        ))
    })
}

/// Renders a seed report as text.
fn render_seed_text(report: &SeedReport) -> String {
    let mut text = format!("seeded {}", report.role);
    for scope in &report.scopes {
        let outcome = match &scope.outcome {
            SeedOutcome::Memoized => "already satisfied this session".to_string(),
            SeedOutcome::Present {
                total,
            } => format!("present ({total} records)"),
            SeedOutcome::Created {
                existing,
                created,
            } => format!("created {created} records ({existing} existed)"),
            SeedOutcome::Reset {
                created,
            } => format!("reset and created {created} records"),
        };
        let _ = write!(text, "\n  {}: {outcome}", scope.scope);
    }
    text
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads configuration, honoring the env path override.
fn load_config(args: &ConfigArgs) -> CliResult<FixtureLeaseConfig> {
    FixtureLeaseConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// Writes pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("json output failed: {err}")))?;
    write_stdout(&rendered)
}

/// Writes a single line to stdout.
fn write_stdout(message: &str) -> CliResult<()> {
    write_stdout_line(message).map_err(|err| CliError::new(output_error(&err)))
}

/// Writes a single line to stdout without using print macros.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr without using print macros.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(error: &std::io::Error) -> String {
    format!("failed to write to stdout: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// crates/routewarden-cli/src/main.rs
// ============================================================================
// Module: Routewarden CLI Entry Point
// Description: Command dispatcher for route-server policy validation runs.
// Purpose: Parse policy documents, run the consistency checker, report results.
// Dependencies: clap, routewarden-core, serde, serde_json, serde_yaml, thiserror.
// ============================================================================

//! ## Overview
//! The Routewarden CLI reads a route-server policy document from disk, runs
//! the policy consistency checker over it, and reports every diagnostic on
//! stderr with a severity prefix. Policy files are untrusted input: reads are
//! size-limited and parse failures abort before any checking starts. An
//! optional machine-readable JSON report captures the outcome for CI use.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use routewarden_core::CollectingSink;
use routewarden_core::Diagnostic;
use routewarden_core::PolicyChecker;
use routewarden_core::ScrubCapability;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a policy document input.
const MAX_POLICY_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "routewarden", disable_help_subcommand = true, disable_version_flag = true)]
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
    /// Validate a route-server policy document.
    Check(CheckCommand),
}

/// Configuration for the `check` command.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Path to the policy document to validate.
    #[arg(long, value_name = "PATH")]
    policy: PathBuf,
    /// Input format of the policy document.
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = PolicyFormatArg::Yaml)]
    format: PolicyFormatArg,
    /// Assume the route server scrubs inbound communities by wildcard only.
    #[arg(long, action = ArgAction::SetTrue)]
    wildcard_scrub: bool,
    /// Optional output path for a machine-readable JSON report.
    #[arg(long, value_name = "PATH")]
    report_json: Option<PathBuf>,
}

/// Input formats accepted for policy documents.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum PolicyFormatArg {
    /// YAML policy document.
    Yaml,
    /// JSON policy document.
    Json,
}

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// Aggregate outcome advertised in a JSON check report.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckOutcome {
    /// Every fatal check passed.
    Valid,
    /// At least one fatal diagnostic was raised.
    Invalid,
}

/// Serializable summary of a single policy check run.
#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    /// Aggregate outcome of the run.
    outcome: CheckOutcome,
    /// Whether the policy relies on RTT-gated communities.
    rtt_based_functions: bool,
    /// Every diagnostic the run produced, in emission order.
    diagnostics: &'a [Diagnostic],
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
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
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("routewarden {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Check(command) => command_check(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Check Command
// ============================================================================

/// Executes the `check` command.
fn command_check(command: &CheckCommand) -> CliResult<ExitCode> {
    let bytes = read_policy_bytes(&command.policy)?;
    let document = parse_policy_document(&bytes, command.format, &command.policy)?;
    let capability = if command.wildcard_scrub {
        ScrubCapability::WildcardOnly
    } else {
        ScrubCapability::RangeCapable
    };

    let checker = PolicyChecker::new(capability);
    let mut sink = CollectingSink::new();
    let result = checker.check(&document, &mut sink);

    for diagnostic in sink.diagnostics() {
        write_stderr_line(&format!("{}: {diagnostic}", diagnostic.severity()))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    let report = match &result {
        Ok(checked) => CheckReport {
            outcome: CheckOutcome::Valid,
            rtt_based_functions: checked.rtt_based_functions,
            diagnostics: sink.diagnostics(),
        },
        Err(_) => CheckReport {
            outcome: CheckOutcome::Invalid,
            rtt_based_functions: false,
            diagnostics: sink.diagnostics(),
        },
    };
    if let Some(path) = command.report_json.as_deref() {
        write_report(path, &report)?;
    }

    match result {
        Ok(_) => {
            write_stdout_line(&format!("policy check passed: {}", command.policy.display()))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            write_stderr_line(&err.to_string())
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Parses policy bytes into a configuration tree.
fn parse_policy_document(bytes: &[u8], format: PolicyFormatArg, path: &Path) -> CliResult<Value> {
    match format {
        PolicyFormatArg::Yaml => serde_yaml::from_slice(bytes).map_err(|err| {
            CliError::new(format!("unable to parse {} as YAML: {err}", path.display()))
        }),
        PolicyFormatArg::Json => serde_json::from_slice(bytes).map_err(|err| {
            CliError::new(format!("unable to parse {} as JSON: {err}", path.display()))
        }),
    }
}

/// Writes the JSON check report to the requested path.
fn write_report(path: &Path, report: &CheckReport<'_>) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(report)
        .map_err(|err| CliError::new(format!("unable to serialize check report: {err}")))?;
    bytes.push(b'\n');
    fs::write(path, bytes).map_err(|err| {
        CliError::new(format!("unable to write check report to {}: {err}", path.display()))
    })
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let read_limit = limit.saturating_add(1);
    let mut limited = file.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads the policy document while enforcing the size limit.
fn read_policy_bytes(path: &Path) -> CliResult<Vec<u8>> {
    read_bytes_with_limit(path, MAX_POLICY_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("unable to read policy {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "policy {} exceeds the size limit ({size} > {limit} bytes)",
            path.display()
        )),
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a stream write failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("unable to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

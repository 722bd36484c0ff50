//! CLI module for cljfmt
//!
//! This module provides the command-line interface for the formatter.
//!
//! ## Usage
//!
//! - `cljfmt` - Format stdin to stdout
//! - `cljfmt <file>` - Print the formatted file to stdout
//! - `cljfmt -l <path>...` - List files whose formatting differs
//! - `cljfmt -w <path>...` - Rewrite files in place
//! - `cljfmt --diff <path>...` - Show a line diff per differing file
//!
//! Directories are walked recursively for `.clj`, `.cljs`, `.cljc`, and `.edn` files.
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use crate::format::{FormatConfig, Transform, load_dot_config};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file picked up from the working directory when `--config` is not given.
pub const DOT_CONFIG: &str = ".cljfmt";

// ============================================================================
// Clap CLI definition
// ============================================================================

/// A full-fidelity Clojure source formatter
#[derive(Parser, Debug)]
#[command(name = "cljfmt")]
#[command(version = VERSION)]
#[command(about = "Format Clojure source files", long_about = None)]
pub struct Cli {
    /// Files or directories to format (reads stdin when omitted)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Print files whose formatting differs from cljfmt's
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Write the result to the source file instead of stdout
    #[arg(short = 'w', long = "write")]
    pub write: bool,

    /// Show a line diff of formatting changes
    #[arg(long)]
    pub diff: bool,

    /// Character to use for indenting
    #[arg(long = "indent-char", value_name = "C", default_value_t = ' ')]
    pub indent_char: char,

    /// Path to a .cljfmt file (default: .cljfmt in the current directory, if present)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable a tree transform (repeatable)
    #[arg(long = "transform", value_name = "NAME", value_parser = parse_transform)]
    pub transforms: Vec<Transform>,
}

impl Cli {
    /// Whether the paths are processed as a batch rather than printed to stdout.
    pub fn batch_mode(&self) -> bool {
        self.list || self.write || self.diff
    }
}

fn parse_transform(name: &str) -> Result<Transform, String> {
    Transform::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Transform::ALL.iter().map(|t| t.name()).collect();
        format!("unknown transform {name:?} (expected one of: {})", known.join(", "))
    })
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = build_config(&cli, Path::new(DOT_CONFIG))?;
    tracing::debug!(?config, "resolved format config");

    if cli.batch_mode() {
        if cli.paths.is_empty() {
            return Err(CliError::failure("Error: -l, -w, and --diff require at least one path"));
        }
        let mode = commands::BatchMode {
            list: cli.list,
            write: cli.write,
            diff: cli.diff,
        };
        return commands::format_files(&cli.paths, mode, &config);
    }

    match cli.paths.as_slice() {
        [] => commands::format_stdin(&config),
        [path] => commands::format_to_stdout(path, &config),
        _ => Err(CliError::failure(
            "Error: must provide a single file unless -l, -w, or --diff is given",
        )),
    }
}

/// Build the format config from flags, layering `.cljfmt` overrides on top.
///
/// An explicit `--config` must exist; the implicit `default_dot_config` is used only if present.
fn build_config(cli: &Cli, default_dot_config: &Path) -> CliResult<FormatConfig> {
    let mut config = FormatConfig::new().with_indent_char(cli.indent_char);
    for &transform in &cli.transforms {
        config = config.with_transform(transform);
    }

    let dot_config = match &cli.config {
        Some(path) => Some(path.as_path()),
        None => default_dot_config.is_file().then_some(default_dot_config),
    };
    if let Some(path) = dot_config {
        let overrides = load_dot_config(path)
            .map_err(|e| CliError::failure(format!("Error loading {}: {}", path.display(), e)))?;
        config = config.with_indent_overrides(overrides);
    }
    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================

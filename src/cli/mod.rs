//! Command-line interface for aikit.
//!
//! # Commands
//!
//! - `generate` - run the full pipeline and write the editor files
//! - `validate` - run everything up to rendering, write nothing
//! - `resolve` - show the resolved module set in dependency order
//! - `list` - list the modules and agents available in the toolkit
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - errors only
//! - `--project-dir <DIR>` - project root, defaults to the current directory
//! - `--toolkit <DIR>` - toolkit directory (also `AIKIT_TOOLKIT`)
//!
//! # Example
//!
//! ```bash
//! aikit generate                      # editors from aikit.json
//! aikit generate --editor cursor      # only Cursor
//! aikit --toolkit ../toolkit validate --format json
//! aikit list modules
//! ```

mod generate;
mod list;
mod resolve;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::constants::TOOLKIT_ENV_VAR;

pub use generate::GenerateCommand;
pub use list::ListCommand;
pub use resolve::ResolveCommand;
pub use validate::ValidateCommand;

/// Runtime configuration for CLI execution.
///
/// Built from the global flags by [`Cli::build_config`]; tests construct it directly so
/// commands run without touching the process environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive for the `aikit_cli` target, e.g. `"debug"`.
    ///
    /// `RUST_LOG` takes precedence when set. `None` leaves logging uninitialized.
    pub log_level: Option<String>,

    /// Suppress everything on stdout except machine-readable output
    pub quiet: bool,
}

impl CliConfig {
    /// Default configuration: no logging, normal output
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Does nothing when a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(format!("aikit_cli={level},aikit={level}"))
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

/// Settings every command needs
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Project root
    pub project_dir: PathBuf,
    /// `--toolkit` or `AIKIT_TOOLKIT`
    pub toolkit: Option<PathBuf>,
    /// `--quiet`
    pub quiet: bool,
}

impl CommandContext {
    /// Toolkit override as a path reference
    pub fn toolkit(&self) -> Option<&Path> {
        self.toolkit.as_deref()
    }
}

/// Output format of the inspection commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for scripts
    Json,
}

/// aikit: generate AI assistant configuration files from a toolkit
#[derive(Parser, Debug)]
#[command(
    name = "aikit",
    about = "Generate AI coding assistant configuration from a shared toolkit",
    version,
    long_about = "aikit merges the project's aikit.json with toolkit defaults, resolves the \
                  requested knowledge modules and agents, and writes CLAUDE.md, Cursor rules, \
                  Copilot instructions, Windsurf rules and AGENTS.md from toolkit templates."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Project root containing aikit.json
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    project_dir: PathBuf,

    /// Toolkit directory
    #[arg(long, global = true, value_name = "DIR", env = TOOLKIT_ENV_VAR)]
    toolkit: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the configuration files of the selected editors
    Generate(GenerateCommand),

    /// Check configuration, modules and templates without writing anything
    Validate(ValidateCommand),

    /// Show the resolved module set in dependency order
    Resolve(ResolveCommand),

    /// List the modules and agents available in the toolkit
    List(ListCommand),
}

impl Cli {
    /// Execute with the configuration derived from the global flags
    ///
    /// # Errors
    ///
    /// Returns the command's error for `main` to report.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// `--verbose` → `debug`, `--quiet` → `error`, otherwise `warn`
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            quiet: self.quiet,
        }
    }

    /// Execute with an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns the command's error for `main` to report.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let ctx = CommandContext {
            project_dir: self.project_dir,
            toolkit: self.toolkit,
            quiet: config.quiet,
        };

        match self.command {
            Commands::Generate(cmd) => cmd.execute(&ctx),
            Commands::Validate(cmd) => cmd.execute(&ctx),
            Commands::Resolve(cmd) => cmd.execute(&ctx),
            Commands::List(cmd) => cmd.execute(&ctx),
        }
    }
}

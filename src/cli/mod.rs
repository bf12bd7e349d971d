//! Command-line interface for CodeKit.
//!
//! This module contains the CLI command implementations for CodeKit. The CLI
//! takes pre-discovered portable items and distributes them into the native
//! configuration formats of the supported coding assistants.
//!
//! # Command Architecture
//!
//! Each command is implemented as a separate module with its own argument
//! structure and execution logic. This modular design allows for:
//! - Clear separation of concerns
//! - Independent testing of each command
//! - Easy addition of new commands
//! - Consistent documentation and error handling
//!
//! # Available Commands
//!
//! - `install` - Install portable items into one or more providers
//! - `providers` - Show which providers support which artifact types
//!
//! # Command Usage Patterns
//!
//! ```bash
//! # Install agents into every supported provider
//! ck install --items items.json --type agent --provider all
//!
//! # Install rules into two providers, user-globally
//! ck install --items rules.json --type rules --provider claude-code,codex --global
//!
//! # Inspect the support matrix
//! ck providers
//! ck providers --type rules
//! ```
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--config` - Path to a custom config file
//! - `--project-dir` - Project root for project-scoped installs
//!
//! # Global vs Project Scope
//!
//! Installs write into one of two trees per provider:
//!
//! | Scope | Example target | Selected by |
//! |-------|----------------|-------------|
//! | Project | `.claude/agents/` | default |
//! | Global | `~/.claude/agents/` | `--global` or `default_scope = "global"` |

pub mod common;
mod install;
mod providers;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Runtime configuration for CLI execution.
///
/// This struct holds configuration derived from global CLI flags, enabling
/// dependency injection and better testability. Tests and programmatic usage
/// can control CLI behavior without re-parsing arguments or touching global
/// state.
///
/// # Usage Pattern
///
/// ```rust,ignore
/// let config = cli.build_config();
/// cli.execute_with_config(config).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter applied when `RUST_LOG` is not set.
    ///
    /// Controls the verbosity of logging output. Common values:
    /// - `"info"`: Errors, warnings, and informational messages
    /// - `"debug"`: All messages including debug information
    ///
    /// When `None`, only errors are logged.
    pub log_level: Option<String>,

    /// Custom path to the global configuration file.
    ///
    /// When specified, overrides the default configuration file location
    /// (`~/.config/ck/config.toml`) and the `CK_CONFIG` environment variable.
    ///
    /// This enables:
    /// - Testing with isolated configuration files
    /// - Alternative configuration layouts
    /// - Shared configuration in team environments
    pub config_path: Option<String>,
}

impl CliConfig {
    /// Create a new CLI configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the global tracing subscriber from this configuration.
    ///
    /// An explicit `RUST_LOG` environment variable wins over the flag-derived
    /// level. Logs go to stderr so `--json` output on stdout stays machine
    /// readable. Calling this more than once is a no-op, which keeps repeated
    /// invocations in tests safe.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
            None => tracing_subscriber::EnvFilter::new("error"),
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Main CLI structure for CodeKit.
///
/// This struct represents the root command and all its global options. It
/// uses the `clap` derive API to generate command-line parsing, help text,
/// and validation. All options marked as `global = true` are available to
/// all subcommands.
///
/// # Design Philosophy
///
/// The CLI follows standard Unix conventions:
/// - Short options use single dashes (`-v`)
/// - Long options use double dashes (`--verbose`)
/// - Global options work with all subcommands
///
/// # Examples
///
/// ```bash
/// ck --verbose install --items items.json --type agent --provider all
/// ck --quiet providers
/// ck --config ./custom.toml install --items items.json --type rules --provider codex
/// ```
#[derive(Parser)]
#[command(
    name = "ck",
    about = "CodeKit - Install portable AI artifacts into coding assistant config formats",
    version,
    author,
    long_about = "CodeKit distributes portable agents, commands, skills, rules, and config \
fragments into the native configuration formats of Claude Code, Cursor, Windsurf, Cline, \
Roo, Kilo, Codex, and Copilot."
)]
pub struct Cli {
    /// The subcommand to execute.
    ///
    /// The available commands are defined in the [`Commands`] enum.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging and detailed information.
    ///
    /// When enabled, shows per-strategy debug messages, lock acquisition
    /// retries, and registry activity. This is equivalent to setting
    /// `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    ///
    /// # Examples
    ///
    /// ```bash
    /// ck --verbose install ...   # Verbose installation
    /// ck -v providers            # Short form
    /// ```
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors for automation.
    ///
    /// When enabled, suppresses informational log messages. Per-provider
    /// result lines and JSON output remain unchanged. Mutually exclusive
    /// with `--verbose`.
    ///
    /// # Examples
    ///
    /// ```bash
    /// ck --quiet install ...     # Silent installation
    /// ck -q providers            # Short form
    /// ```
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to custom global configuration file.
    ///
    /// Overrides the default configuration file location
    /// (`~/.config/ck/config.toml`) with a custom path. This is useful for:
    ///
    /// - **Testing**: Using isolated configuration files
    /// - **Deployment**: Shared configuration in team environments
    ///
    /// The configuration file contains disabled providers, per-provider path
    /// overrides, and the default install scope.
    ///
    /// # Examples
    ///
    /// ```bash
    /// ck --config ./dev-config.toml install ...
    /// ck -c ~/.config/ck/team.toml providers
    /// ```
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Project root for project-scoped installs.
    ///
    /// By default, project-scoped targets are resolved relative to the
    /// current directory. This option allows running from outside the
    /// project, which is useful for:
    ///
    /// - CI/CD pipelines with non-standard layouts
    /// - Testing with temporary project trees
    ///
    /// # Examples
    ///
    /// ```bash
    /// ck --project-dir /path/to/project install --items items.json --type agent --provider all
    /// ```
    #[arg(long, global = true, value_name = "DIR")]
    project_dir: Option<PathBuf>,
}

/// Available subcommands for the CodeKit CLI.
///
/// # Command Execution
///
/// Each command is executed through its respective `execute` method, which
/// handles argument validation, async coordination, and user feedback.
#[derive(Subcommand)]
enum Commands {
    /// Install portable items into one or more providers.
    ///
    /// Reads a JSON array of portable items, converts each one into the
    /// target provider's native format, and writes it using the provider's
    /// write strategy. Prints one result line per provider.
    ///
    /// See [`install::InstallCommand`] for detailed options and behavior.
    Install(install::InstallCommand),

    /// Show which providers support which artifact types.
    ///
    /// Prints the support matrix: for every provider and artifact type,
    /// the write strategy and the project/global target locations.
    ///
    /// See [`providers::ProvidersCommand`] for detailed options and behavior.
    Providers(providers::ProvidersCommand),
}

impl Cli {
    /// Execute the CLI with default configuration.
    ///
    /// This is the main entry point for CLI execution. It builds a
    /// configuration from the parsed command-line arguments and delegates to
    /// [`execute_with_config`](Self::execute_with_config).
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the command executed successfully
    /// - `Err(anyhow::Error)` if the command failed with details for user feedback
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed CLI arguments.
    ///
    /// # Configuration Logic
    ///
    /// - **Verbose mode**: Sets log level to "debug" for detailed output
    /// - **Quiet mode**: Disables logging below the error level
    /// - **Default mode**: Uses "info" level for normal operation
    /// - **Config path**: Uses custom config file if specified
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None // No logging when quiet
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute the CLI with a specific configuration for dependency injection.
    ///
    /// This method enables testing and programmatic usage by accepting an
    /// external configuration instead of building one from CLI arguments.
    /// It's the core execution method that all entry points eventually call.
    ///
    /// # Execution Flow
    ///
    /// 1. **Logging Setup**: Initializes the tracing subscriber
    /// 2. **Command Matching**: Dispatches to the appropriate subcommand
    /// 3. **Error Propagation**: Returns any errors for higher-level handling
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let config_path = config.config_path.map(PathBuf::from);

        match self.command {
            Commands::Install(cmd) => {
                cmd.execute_with_project_dir(self.project_dir, config_path).await
            }
            Commands::Providers(cmd) => cmd.execute(),
        }
    }
}

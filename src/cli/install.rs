//! Install command implementation.
//!
//! This module implements the `ck install` command, which distributes
//! pre-discovered portable items into one or more providers. Discovery is
//! external: the command consumes a JSON array of items and focuses on
//! conversion, placement, and reporting.
//!
//! # Behavior
//!
//! 1. Loads the global configuration (disabled providers, path overrides,
//!    default scope)
//! 2. Reads and parses the items file
//! 3. Resolves the artifact type and provider list, with "did you mean"
//!    suggestions for unknown names
//! 4. Runs the installer once per provider, collecting independent results
//! 5. Prints one line per provider plus any warnings, or a JSON report
//!
//! Provider failures are isolated: one provider failing never blocks the
//! others. The process exits non-zero only when every provider failed.
//!
//! # Examples
//!
//! ```bash
//! # Install agents everywhere
//! ck install --items items.json --type agent --provider all
//!
//! # Install rules into two providers, recording where they came from
//! ck install --items rules.json --type rules --provider claude-code,codex \
//!     --source starter-kit
//!
//! # Machine-readable output for scripting
//! ck install --items items.json --type command --provider cursor --json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::common::{parse_artifact, parse_providers};
use crate::config::GlobalConfig;
use crate::convert::DefaultConverter;
use crate::installer::Installer;
use crate::models::{InstallOptions, InstallResult, PortableItem};
use crate::registry::JsonFileRegistry;

/// Command to install portable items into provider-native locations.
#[derive(Args)]
pub struct InstallCommand {
    /// Path to a JSON file holding the items to install.
    ///
    /// The file must contain a JSON array of portable items, each with a
    /// `name`, a Markdown `body`, and optional `segments`, `frontmatter`,
    /// and `source_path` fields.
    #[arg(long, value_name = "FILE")]
    items: PathBuf,

    /// Artifact type of the items: agent, command, skill, rules, or config.
    #[arg(long = "type", value_name = "TYPE")]
    artifact: String,

    /// Comma-separated list of providers, or "all" for every supported one.
    ///
    /// Providers that don't support the requested artifact type produce a
    /// failed result without affecting the others.
    #[arg(long, value_name = "PROVIDERS")]
    provider: String,

    /// Install into user-global locations instead of the project tree.
    #[arg(long)]
    global: bool,

    /// Origin label recorded in the install registry (e.g., a kit name).
    #[arg(long, value_name = "LABEL")]
    source: Option<String>,

    /// Print results as a JSON array instead of human-readable lines.
    #[arg(long)]
    json: bool,
}

impl InstallCommand {
    /// Execute with an optional project directory and config file override.
    ///
    /// Loads the global configuration (the `--config` path wins over the
    /// `CK_CONFIG` environment variable, which wins over the default
    /// location) and delegates to [`execute_with_config`](Self::execute_with_config).
    pub async fn execute_with_project_dir(
        self,
        project_dir: Option<PathBuf>,
        config_path: Option<PathBuf>,
    ) -> Result<()> {
        let config = match config_path {
            Some(path) => GlobalConfig::load_with_optional(Some(path)).await?,
            None => GlobalConfig::load().await?,
        };
        self.execute_with_config(project_dir, config).await
    }

    /// Execute with an injected configuration.
    ///
    /// # Errors
    ///
    /// Fails when the items file cannot be read or parsed, when the artifact
    /// or provider names are unknown, or when every provider failed to
    /// install.
    pub async fn execute_with_config(
        self,
        project_dir: Option<PathBuf>,
        config: GlobalConfig,
    ) -> Result<()> {
        let artifact = parse_artifact(&self.artifact)?;
        let providers = parse_providers(&self.provider)?;
        let items = self.load_items().await?;

        let project_dir = match project_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("failed to determine current directory")?,
        };

        let options = InstallOptions {
            global: self.global || config.wants_global(),
            lock_timeout: None,
            install_source: self.source.clone(),
        };

        let converter = DefaultConverter;
        let registry = JsonFileRegistry::default_location()?;
        let installer = Installer::new(project_dir, &converter, &registry).with_config(config);

        if !self.json {
            println!(
                "📦 Installing {} {} item(s) for {} provider(s)...",
                items.len(),
                artifact,
                providers.len()
            );
        }

        let results =
            installer.install_portable_items(&items, &providers, artifact, &options).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            print_results(&results);
        }

        // Skips count as successes; only a full wipeout fails the process.
        if !results.is_empty() && results.iter().all(|result| !result.success) {
            anyhow::bail!("installation failed for all {} provider(s)", results.len());
        }
        Ok(())
    }

    async fn load_items(&self) -> Result<Vec<PortableItem>> {
        let text = tokio::fs::read_to_string(&self.items)
            .await
            .with_context(|| format!("failed to read items file: {}", self.items.display()))?;
        serde_json::from_str(&text).with_context(|| {
            format!("items file is not a JSON array of portable items: {}", self.items.display())
        })
    }
}

/// Print one line per provider result, with warnings and per-item skips
/// indented underneath.
fn print_results(results: &[InstallResult]) {
    for result in results {
        let provider = result.provider;
        if result.skipped {
            let reason = result.skip_reason.as_deref().unwrap_or("skipped");
            println!("  {} {provider}: {reason}", "-".yellow());
        } else if result.success {
            let path = result
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default();
            let verb = if result.overwritten { "updated" } else { "installed" };
            println!("  {} {provider}: {verb} {path}", "✓".green());
        } else {
            let error = result.error.as_deref().unwrap_or("unknown error");
            println!("  {} {provider}: {error}", "✗".red());
        }

        for warning in &result.warnings {
            println!("      {} {warning}", "warning:".yellow());
        }
        for item in &result.item_results {
            if let Some(reason) = &item.skip_reason {
                println!("      {} {}: {reason}", "skipped".yellow(), item.name);
            }
        }
    }

    let installed = results.iter().filter(|result| result.success && !result.skipped).count();
    if installed > 0 {
        println!("\n{}", "Install complete!".green().bold());
    }
}

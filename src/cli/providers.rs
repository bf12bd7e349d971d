//! Provider support matrix command.
//!
//! This module implements `ck providers`, which prints every provider's
//! supported artifact types straight from the built-in catalog: the write
//! strategy and the project/global target locations for each combination.
//! Combinations absent from the catalog are simply not printed.
//!
//! # Examples
//!
//! ```bash
//! ck providers              # Full matrix
//! ck providers --type rules # One artifact type across all providers
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::cli::common::parse_artifact;
use crate::models::{ArtifactType, ProviderType};
use crate::providers::{PathConfig, path_config};

/// Command to show which providers support which artifact types.
#[derive(Args)]
pub struct ProvidersCommand {
    /// Only show support for one artifact type.
    #[arg(long = "type", value_name = "TYPE")]
    artifact: Option<String>,
}

impl ProvidersCommand {
    /// Print the support matrix from the built-in catalog.
    ///
    /// # Errors
    ///
    /// Fails when `--type` names an unknown artifact type.
    pub fn execute(self) -> Result<()> {
        let filter = match &self.artifact {
            Some(name) => Some(parse_artifact(name)?),
            None => None,
        };

        for provider in ProviderType::ALL {
            let rows: Vec<(ArtifactType, PathConfig)> = ArtifactType::ALL
                .into_iter()
                .filter(|artifact| filter.is_none_or(|wanted| wanted == *artifact))
                .filter_map(|artifact| {
                    path_config(provider, artifact).map(|config| (artifact, config))
                })
                .collect();
            if rows.is_empty() {
                continue;
            }

            println!("{}", provider.as_str().bold());
            for (artifact, config) in rows {
                println!(
                    "  {:<8} {:<13} {}",
                    artifact.as_str(),
                    config.strategy.name(),
                    describe_locations(&config)
                );
            }
            println!();
        }
        Ok(())
    }
}

fn describe_locations(config: &PathConfig) -> String {
    let mut parts = Vec::new();
    if let Some(path) = &config.project_path {
        parts.push(format!("project: {path}"));
    }
    if let Some(path) = &config.global_path {
        parts.push(format!("global: {path}"));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::WriteStrategy;

    #[test]
    fn test_describe_locations_orders_project_first() {
        let config = PathConfig {
            global_path: Some("~/.claude/agents".to_string()),
            project_path: Some(".claude/agents".to_string()),
            strategy: WriteStrategy::PerFile { nested: true, total_char_limit: None },
            format: crate::providers::OutputFormat::Markdown,
        };
        assert_eq!(
            describe_locations(&config),
            "project: .claude/agents, global: ~/.claude/agents"
        );
    }

    #[test]
    fn test_describe_locations_handles_single_scope() {
        let config = PathConfig {
            global_path: None,
            project_path: Some(".github/copilot-instructions.md".to_string()),
            strategy: WriteStrategy::SingleFile,
            format: crate::providers::OutputFormat::Markdown,
        };
        assert_eq!(describe_locations(&config), "project: .github/copilot-instructions.md");
    }
}

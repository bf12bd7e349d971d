//! Built-in mapping from `(provider, artifact type)` to install behavior.
//!
//! The table below encodes each tool's documented config layout. Absent
//! entries are deliberate: Cursor has no portable agent concept, Copilot
//! artifacts are project-only, and Codex prompts exist only globally.
//! Call sites treat `None` as "unsupported" and report it without writing.

use crate::models::{ArtifactType, ProviderType};
use crate::providers::{OutputFormat, PathConfig, WriteStrategy};

fn per_file(nested: bool) -> WriteStrategy {
    WriteStrategy::PerFile {
        nested,
        total_char_limit: None,
    }
}

/// Look up how `artifact` installs for `provider`.
///
/// Returns `None` when the provider has no representation for this artifact
/// type. The returned paths are patterns (`~/` is expanded at install time).
#[must_use]
pub fn path_config(provider: ProviderType, artifact: ArtifactType) -> Option<PathConfig> {
    use ArtifactType as A;
    use ProviderType as P;

    let config = match (provider, artifact) {
        // Claude Code keeps per-item files under .claude/, with namespaces
        // as subdirectories, and shares CLAUDE.md for rules and config.
        (P::ClaudeCode, A::Agent) => PathConfig {
            global_path: Some("~/.claude/agents".into()),
            project_path: Some(".claude/agents".into()),
            strategy: per_file(true),
            format: OutputFormat::Markdown,
        },
        (P::ClaudeCode, A::Command) => PathConfig {
            global_path: Some("~/.claude/commands".into()),
            project_path: Some(".claude/commands".into()),
            strategy: per_file(true),
            format: OutputFormat::Markdown,
        },
        (P::ClaudeCode, A::Skill) => PathConfig {
            global_path: Some("~/.claude/skills".into()),
            project_path: Some(".claude/skills".into()),
            strategy: per_file(true),
            format: OutputFormat::Markdown,
        },
        (P::ClaudeCode, A::Rules | A::Config) => PathConfig {
            global_path: Some("~/.claude/CLAUDE.md".into()),
            project_path: Some("CLAUDE.md".into()),
            strategy: WriteStrategy::MergeSingle,
            format: OutputFormat::AgentsMd,
        },

        // Cursor: commands and .mdc rules, flat directories.
        (P::Cursor, A::Command) => PathConfig {
            global_path: Some("~/.cursor/commands".into()),
            project_path: Some(".cursor/commands".into()),
            strategy: per_file(false),
            format: OutputFormat::Markdown,
        },
        (P::Cursor, A::Rules) => PathConfig {
            global_path: Some("~/.cursor/rules".into()),
            project_path: Some(".cursor/rules".into()),
            strategy: per_file(false),
            format: OutputFormat::Mdc,
        },

        // Windsurf loads at most ~12k characters of rule text, so the batch
        // is budgeted. Workflows are project-only.
        (P::Windsurf, A::Rules) => PathConfig {
            global_path: Some("~/.codeium/windsurf/memories".into()),
            project_path: Some(".windsurf/rules".into()),
            strategy: WriteStrategy::PerFile {
                nested: false,
                total_char_limit: Some(12_000),
            },
            format: OutputFormat::Markdown,
        },
        (P::Windsurf, A::Command) => PathConfig {
            global_path: None,
            project_path: Some(".windsurf/workflows".into()),
            strategy: per_file(false),
            format: OutputFormat::Markdown,
        },

        (P::Cline, A::Rules) => PathConfig {
            global_path: Some("~/Documents/Cline/Rules".into()),
            project_path: Some(".clinerules".into()),
            strategy: per_file(false),
            format: OutputFormat::Markdown,
        },
        (P::Cline, A::Command) => PathConfig {
            global_path: Some("~/Documents/Cline/Workflows".into()),
            project_path: Some(".clinerules/workflows".into()),
            strategy: per_file(false),
            format: OutputFormat::Markdown,
        },

        // Roo merges agents into its YAML modes list and keeps rules as files.
        (P::Roo, A::Agent) => PathConfig {
            global_path: Some("~/.roo/custom_modes.yaml".into()),
            project_path: Some(".roomodes".into()),
            strategy: WriteStrategy::YamlMerge,
            format: OutputFormat::ModesYaml,
        },
        (P::Roo, A::Rules) => PathConfig {
            global_path: Some("~/.roo/rules".into()),
            project_path: Some(".roo/rules".into()),
            strategy: per_file(false),
            format: OutputFormat::Markdown,
        },

        // Kilo is Roo's JSON sibling: modes in a JSON document, mode rule
        // bodies as files next to it.
        (P::Kilo, A::Agent) => PathConfig {
            global_path: Some("~/.kilocode/custom_modes.json".into()),
            project_path: Some(".kilocodemodes".into()),
            strategy: WriteStrategy::JsonMerge,
            format: OutputFormat::ModesJson,
        },
        (P::Kilo, A::Rules) => PathConfig {
            global_path: Some("~/.kilocode/rules".into()),
            project_path: Some(".kilocode/rules".into()),
            strategy: per_file(false),
            format: OutputFormat::Markdown,
        },

        // Codex has no agent files: agents, rules, and config all become
        // sections of AGENTS.md. Prompts only exist in the home directory.
        (P::Codex, A::Agent | A::Rules | A::Config) => PathConfig {
            global_path: Some("~/.codex/AGENTS.md".into()),
            project_path: Some("AGENTS.md".into()),
            strategy: WriteStrategy::MergeSingle,
            format: OutputFormat::AgentsMd,
        },
        (P::Codex, A::Command) => PathConfig {
            global_path: Some("~/.codex/prompts".into()),
            project_path: None,
            strategy: per_file(false),
            format: OutputFormat::Markdown,
        },

        // Copilot: one wholly-owned instructions file plus *.prompt.md files,
        // both project-only.
        (P::Copilot, A::Rules) => PathConfig {
            global_path: None,
            project_path: Some(".github/copilot-instructions.md".into()),
            strategy: WriteStrategy::SingleFile,
            format: OutputFormat::Markdown,
        },
        (P::Copilot, A::Command) => PathConfig {
            global_path: None,
            project_path: Some(".github/prompts".into()),
            strategy: per_file(false),
            format: OutputFormat::Markdown,
        },

        _ => return None,
    };

    Some(config)
}

//! Provider catalog: how each supported tool wants artifacts written.
//!
//! A provider is a third-party coding tool (Claude Code, Cursor, Roo, ...)
//! with its own config layout. For every `(provider, artifact type)` pair the
//! catalog answers three questions:
//!
//! 1. **Where** do these artifacts live, per scope ([`PathConfig::global_path`]
//!    and [`PathConfig::project_path`])?
//! 2. **How** are they written ([`WriteStrategy`]): one file per item, one
//!    shared file, or a merge into an existing config file?
//! 3. **What shape** does the content take ([`OutputFormat`])?
//!
//! Pairs with no entry are unsupported and the installer reports them as
//! such without touching the filesystem.

pub mod catalog;

pub use catalog::path_config;

use crate::models::{ArtifactType, ProviderType};

/// How items are written into a provider's config tree.
///
/// Strategy-specific knobs live on the variants themselves: a per-file
/// mapping can allow nested subdirectories or enforce an aggregate size
/// budget, while the merge strategies need no extra configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Each item becomes its own file inside a target directory.
    PerFile {
        /// Keep namespace segments as subdirectories instead of flattening
        /// them into dash-joined file names
        nested: bool,
        /// Combined character budget across the whole batch, when the tool
        /// caps how much rule text it will load
        total_char_limit: Option<usize>,
    },

    /// All items of this type share one file that is wholly owned by us.
    SingleFile,

    /// Items become managed sections inside a Markdown file that may also
    /// hold user content.
    MergeSingle,

    /// Items become entries in a `customModes:` YAML list, preserving
    /// foreign entries byte-for-byte.
    YamlMerge,

    /// Items become entries in a `{"customModes": [...]}` JSON document,
    /// with rule bodies written as sibling files.
    JsonMerge,
}

impl WriteStrategy {
    /// Short identifier used in listings and log lines.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            WriteStrategy::PerFile { .. } => "per-file",
            WriteStrategy::SingleFile => "single-file",
            WriteStrategy::MergeSingle => "merge-single",
            WriteStrategy::YamlMerge => "yaml-merge",
            WriteStrategy::JsonMerge => "json-merge",
        }
    }
}

impl std::fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Content shape a converter must produce for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown, optionally with YAML frontmatter
    Markdown,
    /// Cursor `.mdc` rule file (YAML header plus body)
    Mdc,
    /// A managed section for a shared AGENTS.md-style file
    AgentsMd,
    /// One entry for a `customModes:` YAML list
    ModesYaml,
    /// One entry for a `customModes` JSON array
    ModesJson,
}

impl OutputFormat {
    /// Short identifier used in listings and log lines.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Mdc => "mdc",
            OutputFormat::AgentsMd => "agents-md",
            OutputFormat::ModesYaml => "modes-yaml",
            OutputFormat::ModesJson => "modes-json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where and how one artifact type installs for one provider.
///
/// Paths are patterns, not resolved locations: `global_path` may start with
/// `~/` and either path may be absent when the provider doesn't support that
/// scope. For [`WriteStrategy::PerFile`] the paths name a directory; for the
/// other strategies they name the target file itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    /// User-global location pattern, when supported
    pub global_path: Option<String>,
    /// Project-relative location, when supported
    pub project_path: Option<String>,
    /// How items are written at the target
    pub strategy: WriteStrategy,
    /// Content shape the converter must produce
    pub format: OutputFormat,
}

impl PathConfig {
    /// Whether this mapping supports the requested scope.
    #[must_use]
    pub fn supports_scope(&self, global: bool) -> bool {
        if global {
            self.global_path.is_some()
        } else {
            self.project_path.is_some()
        }
    }
}

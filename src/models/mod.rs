//! Shared data models for portable artifacts and install outcomes.
//!
//! This module defines the types that flow through the installer:
//! [`PortableItem`] is the tool-neutral artifact handed to install calls,
//! [`InstallOptions`] selects scope and timing, and [`InstallResult`] reports
//! what happened per provider. Artifact and provider identities live here as
//! well ([`ArtifactType`], [`ProviderType`]) so every layer speaks the same
//! vocabulary.
//!
//! Items arrive already parsed: discovery and frontmatter extraction happen
//! upstream, and the installer only consumes the structured result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::InstallError;

/// Categories of portable artifacts the installer can distribute.
///
/// The type determines which path mapping and write strategy a provider
/// uses, and how the item is rendered (an agent with frontmatter, a plain
/// rule file, a config section).
///
/// # Serialization
///
/// Serializes to lowercase strings (`"agent"`, `"rules"`), matching the
/// on-disk items file and registry records:
///
/// ```rust
/// use codekit_cli::models::ArtifactType;
///
/// let json = serde_json::to_string(&ArtifactType::Agent).unwrap();
/// assert_eq!(json, "\"agent\"");
///
/// let parsed: ArtifactType = serde_json::from_str("\"rules\"").unwrap();
/// assert_eq!(parsed, ArtifactType::Rules);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    /// AI assistant personas with prompts and capability metadata
    Agent,

    /// Custom slash commands or reusable prompts
    Command,

    /// Multi-file skill bundles addressed by their entry document
    Skill,

    /// Always-on guidance files (rules, instructions, conventions)
    Rules,

    /// Tool configuration fragments merged into shared config files
    Config,
}

impl ArtifactType {
    /// All artifact types, in display order.
    pub const ALL: [ArtifactType; 5] = [
        ArtifactType::Agent,
        ArtifactType::Command,
        ArtifactType::Skill,
        ArtifactType::Rules,
        ArtifactType::Config,
    ];

    /// The lowercase identifier used in files and CLI arguments.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Agent => "agent",
            ArtifactType::Command => "command",
            ArtifactType::Skill => "skill",
            ArtifactType::Rules => "rules",
            ArtifactType::Config => "config",
        }
    }
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ArtifactType {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "agent" | "agents" => Ok(ArtifactType::Agent),
            "command" | "commands" => Ok(ArtifactType::Command),
            "skill" | "skills" => Ok(ArtifactType::Skill),
            "rule" | "rules" => Ok(ArtifactType::Rules),
            "config" => Ok(ArtifactType::Config),
            _ => Err(InstallError::Other {
                message: format!("unknown artifact type: {s}"),
            }),
        }
    }
}

/// Third-party coding tools CodeKit can install into.
///
/// Each provider maps artifact types onto its own config layout through the
/// catalog in [`crate::providers`]. Serializes to kebab-case identifiers
/// (`"claude-code"`, `"roo"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderType {
    /// Claude Code (`.claude/` tree plus CLAUDE.md)
    ClaudeCode,
    /// Cursor (`.cursor/` tree with `.mdc` rules)
    Cursor,
    /// Windsurf (`.windsurf/` tree with an aggregate rules budget)
    Windsurf,
    /// Cline (`.clinerules/` tree)
    Cline,
    /// Roo Code (`.roomodes` YAML modes file)
    Roo,
    /// Kilo Code (`.kilocodemodes` JSON modes file plus rule files)
    Kilo,
    /// Codex CLI (AGENTS.md plus global prompts)
    Codex,
    /// GitHub Copilot (instructions and prompt files)
    Copilot,
}

impl ProviderType {
    /// All supported providers, in display order.
    pub const ALL: [ProviderType; 8] = [
        ProviderType::ClaudeCode,
        ProviderType::Cursor,
        ProviderType::Windsurf,
        ProviderType::Cline,
        ProviderType::Roo,
        ProviderType::Kilo,
        ProviderType::Codex,
        ProviderType::Copilot,
    ];

    /// The kebab-case identifier used in files and CLI arguments.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProviderType::ClaudeCode => "claude-code",
            ProviderType::Cursor => "cursor",
            ProviderType::Windsurf => "windsurf",
            ProviderType::Cline => "cline",
            ProviderType::Roo => "roo",
            ProviderType::Kilo => "kilo",
            ProviderType::Codex => "codex",
            ProviderType::Copilot => "copilot",
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderType {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude-code" | "claude" => Ok(ProviderType::ClaudeCode),
            "cursor" => Ok(ProviderType::Cursor),
            "windsurf" => Ok(ProviderType::Windsurf),
            "cline" => Ok(ProviderType::Cline),
            "roo" => Ok(ProviderType::Roo),
            "kilo" => Ok(ProviderType::Kilo),
            "codex" => Ok(ProviderType::Codex),
            "copilot" => Ok(ProviderType::Copilot),
            _ => Err(InstallError::Other {
                message: format!("unknown provider: {s}"),
            }),
        }
    }
}

/// A tool-neutral artifact ready to be installed.
///
/// Items carry their parsed frontmatter as a sorted map of JSON values so
/// converters can pick the fields each output format needs. The body is the
/// Markdown content without the frontmatter block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortableItem {
    /// Base name of the item (no directories, no extension)
    pub name: String,

    /// Optional namespace segments, outermost first (e.g., `["review", "rust"]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<String>>,

    /// Parsed frontmatter key-value pairs
    #[serde(default)]
    pub frontmatter: BTreeMap<String, serde_json::Value>,

    /// Markdown body without the frontmatter block
    pub body: String,

    /// Where the item was discovered, when it came from a file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl PortableItem {
    /// Create a minimal item with just a name and body.
    #[must_use]
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            segments: None,
            frontmatter: BTreeMap::new(),
            body: body.into(),
            source_path: None,
        }
    }

    /// Human-readable name: the frontmatter `name` field when present and a
    /// non-empty string, otherwise the item name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if let Some(serde_json::Value::String(s)) = self.frontmatter.get("name")
            && !s.trim().is_empty()
        {
            return s;
        }
        &self.name
    }

    /// Namespace-qualified name with `/` separators (e.g., `review/rust/strict`).
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.segments {
            Some(segments) if !segments.is_empty() => {
                let mut parts = segments.clone();
                parts.push(self.name.clone());
                parts.join("/")
            }
            _ => self.name.clone(),
        }
    }

    /// Set the namespace segments.
    #[must_use]
    pub fn with_segments(mut self, segments: Vec<String>) -> Self {
        self.segments = Some(segments);
        self
    }

    /// Add one frontmatter field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.frontmatter.insert(key.into(), value);
        self
    }

    /// Set the originating file path.
    #[must_use]
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }
}

/// Options controlling a single install call.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Install into the user-global location instead of the project tree
    pub global: bool,

    /// Override for the merge-lock acquisition timeout
    pub lock_timeout: Option<Duration>,

    /// Origin label recorded in the install registry (e.g., a kit name)
    pub install_source: Option<String>,
}

/// Outcome of one item within a batched per-file install.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    /// The item's name
    pub name: String,

    /// Whether this item was written (or skipped without error)
    pub success: bool,

    /// Where the item landed, when it was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Whether the item was skipped without writing
    pub skipped: bool,

    /// Why the item was skipped, when it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,

    /// The failure message when `success` is `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of installing one artifact (or one batch) into one provider.
///
/// A skipped install is still a successful one: `success` stays `true` and
/// `skip_reason` explains why nothing was written. Warnings carry per-item
/// notes that didn't fail the call (duplicate keys, partial batch failures).
#[derive(Debug, Clone, Serialize)]
pub struct InstallResult {
    /// The provider this result describes
    pub provider: ProviderType,

    /// Whether the install completed without error
    pub success: bool,

    /// Path that was written (or would have been, for skips)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Whether an existing file was replaced or merged into
    pub overwritten: bool,

    /// Whether the install was skipped without writing
    pub skipped: bool,

    /// Why the install was skipped, when it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,

    /// Non-fatal notes accumulated during the install
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// The failure message when `success` is `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Per-item outcomes for batched per-file installs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_results: Vec<ItemResult>,
}

impl InstallResult {
    /// A successful install that wrote to `path`.
    #[must_use]
    pub fn success(provider: ProviderType, path: PathBuf) -> Self {
        Self {
            provider,
            success: true,
            path: Some(path),
            overwritten: false,
            skipped: false,
            skip_reason: None,
            warnings: Vec::new(),
            error: None,
            item_results: Vec::new(),
        }
    }

    /// A successful no-op with an explanation.
    #[must_use]
    pub fn skipped(provider: ProviderType, reason: impl Into<String>) -> Self {
        Self {
            provider,
            success: true,
            path: None,
            overwritten: false,
            skipped: true,
            skip_reason: Some(reason.into()),
            warnings: Vec::new(),
            error: None,
            item_results: Vec::new(),
        }
    }

    /// A failed install with an error message.
    #[must_use]
    pub fn failed(provider: ProviderType, error: impl Into<String>) -> Self {
        Self {
            provider,
            success: false,
            path: None,
            overwritten: false,
            skipped: false,
            skip_reason: None,
            warnings: Vec::new(),
            error: Some(error.into()),
            item_results: Vec::new(),
        }
    }

    /// Mark that the install replaced or merged into existing content.
    #[must_use]
    pub fn with_overwritten(mut self, overwritten: bool) -> Self {
        self.overwritten = overwritten;
        self
    }

    /// Attach the path the result refers to.
    #[must_use]
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    /// Append non-fatal warnings.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    /// Attach per-item outcomes.
    #[must_use]
    pub fn with_item_results(mut self, item_results: Vec<ItemResult>) -> Self {
        self.item_results = item_results;
        self
    }
}

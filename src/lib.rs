//! CodeKit - Portable AI artifact installer
//!
//! CodeKit distributes tool-neutral AI-assistant artifacts (agents, commands,
//! skills, rules, and config fragments) into the native configuration formats
//! of eight coding tools: Claude Code, Cursor, Windsurf, Cline, Roo, Kilo,
//! Codex, and Copilot. One portable item in, provider-native files out.
//!
//! # Architecture Overview
//!
//! CodeKit follows a catalog/strategy model where:
//! - A built-in catalog maps each provider and artifact type to target
//!   locations and a write strategy
//! - Five write strategies cover the provider landscape: per-file directories,
//!   wholly-owned single files, managed sections in shared Markdown, YAML
//!   mode lists, and JSON mode documents with sibling rule files
//! - A converter turns each item into the provider's content shape before
//!   any path is touched
//! - An install registry records what landed where, with checksums and
//!   section ownership, so later installs update only their own contribution
//!
//! ## Key Features
//!
//! - **Isolation**: One provider failing never blocks the others
//! - **Merge safety**: Shared files are guarded by cross-process locks and
//!   snapshots that restore the previous bytes on failure
//! - **Foreign content preservation**: Merges never rewrite entries or
//!   sections the installer doesn't own
//! - **Security**: Item names are validated against traversal, separator
//!   smuggling, and percent-encoded escapes before any write
//! - **Cross-platform**: Works on Windows, macOS, and Linux with proper
//!   path handling
//!
//! # Core Modules
//!
//! ## Install Pipeline
//! - [`installer`] - Strategy dispatch, locking, snapshots, and rollback
//! - [`convert`] - Conversion from portable items to provider-native text
//! - [`providers`] - The provider catalog: strategies, formats, locations
//! - [`registry`] - Install provenance records with checksums and ownership
//!
//! ## Content Handling
//! - [`markdown`] - Fence-aware section parsing for shared Markdown targets
//! - [`models`] - Portable items, install options, and result types
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface (`ck install`, `ck providers`)
//! - [`config`] - Global configuration with per-provider path overrides
//! - [`constants`] - Timeouts, retry parameters, and marker names
//! - [`core`] - Error taxonomy and user-facing error contexts
//! - [`utils`] - Atomic writes, checksums, path validation, path expansion
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Install agents into every supported provider
//! ck install --items items.json --type agent --provider all
//!
//! # Install rules into two providers, user-globally
//! ck install --items rules.json --type rules --provider claude-code,codex --global
//!
//! # Show the support matrix
//! ck providers
//! ```
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use codekit_cli::convert::DefaultConverter;
//! use codekit_cli::installer::Installer;
//! use codekit_cli::models::{ArtifactType, InstallOptions, PortableItem, ProviderType};
//! use codekit_cli::registry::JsonFileRegistry;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let converter = DefaultConverter;
//! let registry = JsonFileRegistry::default_location()?;
//! let installer = Installer::new(".", &converter, &registry);
//!
//! let items = vec![PortableItem::new("reviewer", "You are a code reviewer.")];
//! let results = installer
//!     .install_portable_items(
//!         &items,
//!         &[ProviderType::ClaudeCode, ProviderType::Codex],
//!         ArtifactType::Agent,
//!         &InstallOptions::default(),
//!     )
//!     .await;
//!
//! for result in results {
//!     println!("{}: success={}", result.provider, result.success);
//! }
//! # Ok(())
//! # }
//! ```

// Install pipeline
pub mod convert;
pub mod installer;
pub mod providers;
pub mod registry;

// Content handling
pub mod markdown;
pub mod models;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod utils;

// Test utilities (available for integration tests)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

//! The portable-item installer.
//!
//! This is the engine that takes already-discovered artifact items and
//! writes them into provider config files. One call installs one batch of
//! items for one provider and artifact type; the write shape is chosen by
//! the provider catalog:
//!
//! - **Per-file**: every item gets its own file under a base directory,
//!   optionally budgeted by an aggregate character cap.
//! - **Single-file**: one item replaces one fixed file wholesale.
//! - **Merge-single**: items become `## Agent:`/`## Rule:`/`## Config`
//!   sections of a shared Markdown file, merged with whatever is there.
//! - **YAML-merge / JSON-merge**: items become entries of a shared mode
//!   list, merged by slug.
//!
//! Existing user content is never destroyed: shared targets are parsed and
//! rebuilt around foreign sections, every mutated file is snapshotted first
//! and restored on failure, and the shared-target strategies serialize
//! against concurrent processes with an advisory file lock.
//!
//! Errors are captured into the returned [`InstallResult`] rather than
//! propagated, so one provider's failure never aborts a multi-provider
//! batch.

pub mod merge_lock;
pub mod snapshot;

mod json_merge;
mod merge_single;
mod per_file;
mod yaml_merge;


pub use merge_lock::MergeLock;
pub use snapshot::FileSnapshot;

use std::path::{Path, PathBuf};

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::config::GlobalConfig;
use crate::convert::Converter;
use crate::models::{ArtifactType, InstallOptions, InstallResult, PortableItem, ProviderType};
use crate::providers::{OutputFormat, PathConfig, WriteStrategy, path_config};
use crate::registry::{InstallRegistry, RegistryRecord};
use crate::utils::{get_home_dir, resolve_path};

/// Installs portable items into provider-native config targets.
///
/// The converter and registry are injected so callers can substitute fakes;
/// the CLI wires in [`DefaultConverter`](crate::convert::DefaultConverter)
/// and [`JsonFileRegistry`](crate::registry::JsonFileRegistry).
pub struct Installer<'a> {
    project_dir: PathBuf,
    converter: &'a dyn Converter,
    registry: &'a dyn InstallRegistry,
    config: GlobalConfig,
}

impl<'a> Installer<'a> {
    pub fn new(
        project_dir: impl Into<PathBuf>,
        converter: &'a dyn Converter,
        registry: &'a dyn InstallRegistry,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            converter,
            registry,
            config: GlobalConfig::default(),
        }
    }

    /// Apply user configuration (disabled providers, path overrides).
    #[must_use]
    pub fn with_config(mut self, config: GlobalConfig) -> Self {
        self.config = config;
        self
    }

    /// Install `items` into every provider in `providers`, one result per
    /// provider.
    ///
    /// Providers are attempted one at a time and isolated from each other: a
    /// failure writing provider A's target still attempts provider B. Codex
    /// commands only exist in the home directory, so that combination is
    /// forced to the global scope here rather than failing the provider.
    pub async fn install_portable_items(
        &self,
        items: &[PortableItem],
        providers: &[ProviderType],
        artifact: ArtifactType,
        options: &InstallOptions,
    ) -> Vec<InstallResult> {
        stream::iter(providers.iter().copied())
            .then(|provider| async move {
                let mut options = options.clone();
                if provider == ProviderType::Codex && artifact == ArtifactType::Command {
                    options.global = true;
                }
                self.install_portable_item(items, provider, artifact, &options).await
            })
            .collect()
            .await
    }

    /// Install `items` for one provider and artifact type.
    ///
    /// Never returns `Err`: every failure mode lands in the result's `error`
    /// field so batch callers can keep going.
    pub async fn install_portable_item(
        &self,
        items: &[PortableItem],
        provider: ProviderType,
        artifact: ArtifactType,
        options: &InstallOptions,
    ) -> InstallResult {
        if self.config.is_disabled(provider) {
            return InstallResult::skipped(provider, "provider is disabled in configuration");
        }
        if items.is_empty() {
            return InstallResult::skipped(provider, "no items to install");
        }

        let Some(path_config) = path_config(provider, artifact) else {
            return InstallResult::failed(
                provider,
                format!("provider {provider} does not support {artifact} artifacts"),
            );
        };

        let Some(pattern) = self.base_pattern(provider, artifact, options.global, &path_config)
        else {
            let scope = if options.global { "global" } else { "project" };
            return InstallResult::failed(
                provider,
                format!(
                    "provider {provider} does not support {scope}-level installation \
                     for {artifact} artifacts"
                ),
            );
        };

        let base = match self.resolve_target_base(&pattern, options.global) {
            Ok(base) => base,
            Err(e) => return InstallResult::failed(provider, e.to_string()),
        };

        debug!(
            provider = %provider,
            artifact = %artifact,
            strategy = %path_config.strategy,
            base = %base.display(),
            items = items.len(),
            "Dispatching install"
        );

        let ctx = InstallContext {
            items,
            provider,
            artifact,
            format: path_config.format,
            base,
            options,
            converter: self.converter,
            registry: self.registry,
        };

        match path_config.strategy {
            WriteStrategy::PerFile {
                nested,
                total_char_limit,
            } => per_file::install_batch(&ctx, nested, total_char_limit).await,
            WriteStrategy::SingleFile => per_file::install_fixed(&ctx).await,
            WriteStrategy::MergeSingle => merge_single::install(&ctx).await,
            WriteStrategy::YamlMerge => yaml_merge::install(&ctx).await,
            WriteStrategy::JsonMerge => json_merge::install(&ctx).await,
        }
    }

    /// The base-path pattern for this combination, user overrides first.
    fn base_pattern(
        &self,
        provider: ProviderType,
        artifact: ArtifactType,
        global: bool,
        path_config: &PathConfig,
    ) -> Option<String> {
        if let Some(override_path) = self.config.path_override(provider, artifact, global) {
            return Some(override_path.to_string());
        }
        if global {
            path_config.global_path.clone()
        } else {
            path_config.project_path.clone()
        }
    }

    /// Expand a catalog path pattern into an absolute target base. Project
    /// paths anchor at the project directory, global ones at home.
    fn resolve_target_base(&self, pattern: &str, global: bool) -> Result<PathBuf> {
        let expanded = resolve_path(pattern)?;
        if expanded.is_absolute() {
            Ok(expanded)
        } else if global {
            Ok(get_home_dir()?.join(expanded))
        } else {
            Ok(self.project_dir.join(expanded))
        }
    }
}

/// Everything one strategy invocation needs, borrowed from the installer.
pub(crate) struct InstallContext<'a> {
    pub items: &'a [PortableItem],
    pub provider: ProviderType,
    pub artifact: ArtifactType,
    pub format: OutputFormat,
    /// Resolved target base: a directory for per-file, the target file for
    /// the single-file and merge strategies.
    pub base: PathBuf,
    pub options: &'a InstallOptions,
    pub converter: &'a dyn Converter,
    pub registry: &'a dyn InstallRegistry,
}

impl InstallContext<'_> {
    /// A registry record for `item` at `path`, stamped with this call's
    /// provenance.
    fn record_for(&self, item: &PortableItem, path: &Path) -> RegistryRecord {
        RegistryRecord::new(
            item.name.clone(),
            self.artifact,
            self.provider,
            self.options.global,
            path,
        )
        .with_install_source(self.options.install_source.clone())
    }

    /// Persist a record, logging instead of failing: provenance is
    /// best-effort and never undoes a completed write.
    fn register(&self, record: RegistryRecord) {
        if let Err(e) = self.registry.record(record) {
            warn!(error = %e, "Failed to record install in registry");
        }
    }
}

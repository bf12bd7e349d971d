//! Global user configuration.
//!
//! The global config file (`~/.config/ck/config.toml`) carries user-wide
//! install preferences: a default scope, providers to skip entirely, and
//! per-provider base-path overrides. It is never required; a missing file
//! behaves like the defaults. The location can be overridden with the
//! `CK_CONFIG` environment variable or an explicit `--config` path.
//!
//! # File Format
//!
//! ```toml
//! default_scope = "project"
//! disabled_providers = ["kilo"]
//!
//! [paths.windsurf.rules]
//! project = ".windsurf/extra-rules"
//! global = "~/notes/windsurf-memories"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::constants::CONFIG_ENV_VAR;
use crate::models::{ArtifactType, ProviderType};
use crate::utils::platform::config_dir;

/// Which tree an install writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Project,
    Global,
}

/// One provider+artifact base-path override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,
}

/// Global configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Scope used when the CLI is not told `--global`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scope: Option<Scope>,

    /// Providers the installer skips without writing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_providers: Vec<ProviderType>,

    /// Base-path overrides, keyed by provider then artifact type
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub paths: HashMap<ProviderType, HashMap<ArtifactType, PathOverride>>,
}

impl GlobalConfig {
    /// Load from the default location, honoring the `CK_CONFIG` override.
    ///
    /// A missing file yields the default configuration rather than an error.
    pub async fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load_with_optional(Some(PathBuf::from(path))).await;
        }
        Self::load_with_optional(None).await
    }

    /// Load from `path` when given, else the default location.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid TOML for this
    /// schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Write the configuration to `path`, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// The default config file path, `~/.config/ck/config.toml` or the
    /// platform equivalent.
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    pub fn is_disabled(&self, provider: ProviderType) -> bool {
        self.disabled_providers.contains(&provider)
    }

    /// Whether installs default to the global scope.
    pub fn wants_global(&self) -> bool {
        self.default_scope == Some(Scope::Global)
    }

    /// The configured base-path override for one provider, artifact, and
    /// scope, when set.
    pub fn path_override(
        &self,
        provider: ProviderType,
        artifact: ArtifactType,
        global: bool,
    ) -> Option<&str> {
        let entry = self.paths.get(&provider)?.get(&artifact)?;
        let path = if global {
            entry.global.as_deref()
        } else {
            entry.project.as_deref()
        };
        path.filter(|p| !p.trim().is_empty())
    }
}

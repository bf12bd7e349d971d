//! Install provenance records.
//!
//! Every successful write registers what landed where: checksums of the
//! source and written content, and the section keys or slugs the item owns
//! inside a shared target. Later installs use ownership to update one item's
//! contribution without touching its neighbors. Strategies treat the
//! registry as fire-and-forget: a failed record is logged as a warning and
//! the install result stands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{ArtifactType, ProviderType};
use crate::utils::platform::config_dir;
use crate::utils::{atomic_write, ensure_dir};

/// One installed item's provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Item name as given by the caller
    pub name: String,
    pub artifact_type: ArtifactType,
    pub provider: ProviderType,
    /// Whether the install targeted the user-global location
    pub global: bool,
    /// The file the item landed in (shared targets repeat across items)
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_checksum: Option<String>,
    /// Section keys or slugs this item owns inside a shared target
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owned_sections: Vec<String>,
    /// Caller-supplied label for where the kit came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_source: Option<String>,
    /// RFC 3339 timestamp of the write
    pub installed_at: String,
}

impl RegistryRecord {
    pub fn new(
        name: impl Into<String>,
        artifact_type: ArtifactType,
        provider: ProviderType,
        global: bool,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            artifact_type,
            provider,
            global,
            path: path.into(),
            source_path: None,
            source_checksum: None,
            target_checksum: None,
            owned_sections: Vec::new(),
            install_source: None,
            installed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, path: Option<PathBuf>, checksum: Option<String>) -> Self {
        self.source_path = path;
        self.source_checksum = checksum;
        self
    }

    #[must_use]
    pub fn with_target_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.target_checksum = Some(checksum.into());
        self
    }

    #[must_use]
    pub fn with_owned_sections(mut self, sections: Vec<String>) -> Self {
        self.owned_sections = sections;
        self
    }

    #[must_use]
    pub fn with_install_source(mut self, source: Option<String>) -> Self {
        self.install_source = source;
        self
    }

    /// Records are upserted by this identity.
    fn same_slot(&self, other: &RegistryRecord) -> bool {
        self.name == other.name
            && self.artifact_type == other.artifact_type
            && self.provider == other.provider
            && self.global == other.global
    }
}

/// Sink for install provenance.
///
/// Implementations must tolerate concurrent calls from separate processes;
/// the installer takes no lock around `record`.
pub trait InstallRegistry: Send + Sync {
    /// Upsert one record, replacing any prior record for the same item,
    /// artifact type, provider, and scope.
    fn record(&self, record: RegistryRecord) -> Result<()>;
}

/// File-backed registry keeping one JSON array of records.
#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The registry at its default location under the user config directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(config_dir()?.join("installs.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<RegistryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read registry: {}", self.path.display()))?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text)
            .with_context(|| format!("registry is not valid JSON: {}", self.path.display()))
    }
}

impl InstallRegistry for JsonFileRegistry {
    fn record(&self, record: RegistryRecord) -> Result<()> {
        let mut records = self.load()?;
        records.retain(|existing| !existing.same_slot(&record));
        records.push(record);

        let json = serde_json::to_string_pretty(&records)
            .context("failed to encode install registry")?;
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        atomic_write(&self.path, json.as_bytes())?;
        Ok(())
    }
}

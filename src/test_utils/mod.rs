//! Test utilities for CodeKit
//!
//! In-memory fakes for the converter and registry seams, plus small item
//! builders, shared by unit tests and the integration suite. Nothing here
//! touches the real registry location or the user's home directory; tests
//! that need a global install path inject an absolute override through
//! [`GlobalConfig`](crate::config::GlobalConfig) instead.

use std::sync::{Mutex, Once};

use serde_json::json;

use crate::convert::{Conversion, ConversionError, Converter};
use crate::models::{PortableItem, ProviderType};
use crate::providers::OutputFormat;
use crate::registry::{InstallRegistry, RegistryRecord};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize tracing for tests, once per process.
///
/// Respects `RUST_LOG` when set and stays quiet otherwise. Safe to call
/// from every test; only the first call does anything.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Registry fake that collects records in memory.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    records: Mutex<Vec<RegistryRecord>>,
}

impl MemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<RegistryRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Item names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.name).collect()
    }
}

impl InstallRegistry for MemoryRegistry {
    fn record(&self, record: RegistryRecord) -> anyhow::Result<()> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

/// Registry fake that always fails, for the warn-and-continue path.
#[derive(Debug, Default)]
pub struct FailingRegistry;

impl InstallRegistry for FailingRegistry {
    fn record(&self, _record: RegistryRecord) -> anyhow::Result<()> {
        anyhow::bail!("registry unavailable")
    }
}

/// Converter whose output is the item body verbatim, named
/// `<qualified-name>.md`.
///
/// Gives tests exact control over written bytes and sizes.
#[derive(Debug, Default)]
pub struct PassthroughConverter;

impl Converter for PassthroughConverter {
    fn convert(
        &self,
        item: &PortableItem,
        _format: OutputFormat,
        _provider: ProviderType,
    ) -> Result<Conversion, ConversionError> {
        Ok(Conversion {
            content: item.body.clone(),
            filename: format!("{}.md", item.qualified_name()),
            warnings: Vec::new(),
        })
    }
}

/// Converter that always fails with a fixed message.
#[derive(Debug)]
pub struct FailingConverter {
    message: String,
}

impl FailingConverter {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Converter for FailingConverter {
    fn convert(
        &self,
        _item: &PortableItem,
        _format: OutputFormat,
        _provider: ProviderType,
    ) -> Result<Conversion, ConversionError> {
        Err(ConversionError::new(self.message.clone()))
    }
}

/// Minimal agent-flavored item: a description field plus a one-line body.
#[must_use]
pub fn agent_item(name: &str) -> PortableItem {
    PortableItem::new(name, format!("You are the {name} agent."))
        .with_field("description", json!(format!("{name} helper")))
}

/// Rule item with an explicit body.
#[must_use]
pub fn rule_item(name: &str, body: &str) -> PortableItem {
    PortableItem::new(name, body)
}

//! Conversion boundary between portable items and provider-native text.
//!
//! Install strategies never render content themselves. Each [`PortableItem`]
//! is handed to a [`Converter`] together with the output dialect the target
//! provider expects, and the strategy writes whatever comes back. The
//! indirection keeps rendering pluggable: the CLI wires in
//! [`DefaultConverter`], tests substitute fakes that return fixed content or
//! fail on purpose.

mod default;

pub use default::DefaultConverter;

use crate::models::{PortableItem, ProviderType};
use crate::providers::OutputFormat;

/// A successfully rendered item.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Provider-native text, written verbatim by the per-file strategies and
    /// merged into shared targets by the others.
    pub content: String,

    /// Suggested file name, possibly `/`-nested. The mode-list strategies
    /// repurpose this as the entry slug.
    pub filename: String,

    /// Non-fatal notes to surface on the install result.
    pub warnings: Vec<String>,
}

/// A failed rendering, keeping any warnings gathered before the failure.
#[derive(Debug, Clone)]
pub struct ConversionError {
    pub message: String,
    pub warnings: Vec<String>,
}

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            warnings: Vec::new(),
        }
    }
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConversionError {}

/// Renders portable items into one provider's native representation.
///
/// Implementations must be pure: no filesystem or network access. Strategies
/// convert before taking locks or snapshots, so a conversion failure never
/// leaves partial state behind.
pub trait Converter: Send + Sync {
    /// Convert `item` into `format` for `provider`.
    fn convert(
        &self,
        item: &PortableItem,
        format: OutputFormat,
        provider: ProviderType,
    ) -> Result<Conversion, ConversionError>;
}

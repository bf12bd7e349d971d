//! Built-in renderings for each output dialect.
//!
//! Markdown and `.mdc` outputs keep the item's frontmatter as a YAML header.
//! The mode dialects build one list entry per item, keyed by a slug derived
//! from the namespace-qualified item name. Section bodies for shared
//! Markdown targets stay headingless; the merge strategy owns the heading.

use serde_json::{Value, json};

use crate::models::{PortableItem, ProviderType};
use crate::providers::OutputFormat;

use super::{Conversion, ConversionError, Converter};

/// The converter the CLI installs with.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConverter;

impl Converter for DefaultConverter {
    fn convert(
        &self,
        item: &PortableItem,
        format: OutputFormat,
        provider: ProviderType,
    ) -> Result<Conversion, ConversionError> {
        match format {
            OutputFormat::Markdown => render_markdown(item, provider),
            OutputFormat::Mdc => render_document(item, "mdc"),
            OutputFormat::AgentsMd => render_section_body(item),
            OutputFormat::ModesYaml => render_mode_yaml(item),
            OutputFormat::ModesJson => render_mode_json(item),
        }
    }
}

fn render_markdown(
    item: &PortableItem,
    provider: ProviderType,
) -> Result<Conversion, ConversionError> {
    // Copilot only picks up prompt files with the double extension.
    let extension = if provider == ProviderType::Copilot {
        "prompt.md"
    } else {
        "md"
    };
    render_document(item, extension)
}

/// Render the item as a standalone Markdown document with an optional YAML
/// frontmatter header.
fn render_document(item: &PortableItem, extension: &str) -> Result<Conversion, ConversionError> {
    let body = item.body.trim();
    let content = if item.frontmatter.is_empty() {
        format!("{body}\n")
    } else {
        let yaml = serde_yaml::to_string(&item.frontmatter).map_err(|e| {
            ConversionError::new(format!(
                "failed to serialize frontmatter for '{}': {e}",
                item.name
            ))
        })?;
        format!("---\n{yaml}---\n\n{body}\n")
    };

    Ok(Conversion {
        content,
        filename: format!("{}.{extension}", item.qualified_name()),
        warnings: Vec::new(),
    })
}

/// Render the body of a shared-Markdown section. The description line from
/// frontmatter, when present, leads the body.
fn render_section_body(item: &PortableItem) -> Result<Conversion, ConversionError> {
    let mut parts = Vec::new();
    if let Some(description) = item.frontmatter.get("description").and_then(Value::as_str)
        && !description.trim().is_empty()
    {
        parts.push(description.trim().to_string());
    }
    let body = item.body.trim();
    if !body.is_empty() {
        parts.push(body.to_string());
    }

    Ok(Conversion {
        content: parts.join("\n\n"),
        filename: format!("{}.md", item.qualified_name()),
        warnings: Vec::new(),
    })
}

fn render_mode_yaml(item: &PortableItem) -> Result<Conversion, ConversionError> {
    let slug = mode_slug(item);
    let mut entry = String::new();
    entry.push_str(&format!("  - slug: {}\n", quoted(&slug)));
    entry.push_str(&format!("    name: {}\n", quoted(item.display_name())));
    push_block_scalar(&mut entry, "roleDefinition", &item.body);
    entry.push_str(&format!("    groups: {}\n", groups_value(item).1));
    if let Some(instructions) = item.frontmatter.get("instructions").and_then(Value::as_str)
        && !instructions.trim().is_empty()
    {
        push_block_scalar(&mut entry, "customInstructions", instructions);
    }

    Ok(Conversion {
        content: entry,
        filename: slug,
        warnings: groups_warning(item),
    })
}

fn render_mode_json(item: &PortableItem) -> Result<Conversion, ConversionError> {
    let slug = mode_slug(item);
    let instructions = item
        .frontmatter
        .get("instructions")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    let record = json!({
        "slug": slug.as_str(),
        "name": item.display_name(),
        "roleDefinition": item.body.trim(),
        "groups": groups_value(item).0,
        "customInstructions": instructions,
    });
    let content = serde_json::to_string_pretty(&record).map_err(|e| {
        ConversionError::new(format!("failed to encode mode record for '{}': {e}", item.name))
    })?;

    Ok(Conversion {
        content,
        filename: slug,
        warnings: groups_warning(item),
    })
}

/// Slug for the mode dialects: the qualified name with namespace separators
/// flattened to dashes, lowercased.
fn mode_slug(item: &PortableItem) -> String {
    item.qualified_name().replace('/', "-").to_lowercase()
}

/// The item's tool-group list as both a JSON value and flow-YAML text.
/// Defaults to read/edit access when the frontmatter does not say.
fn groups_value(item: &PortableItem) -> (Value, String) {
    let value = item
        .frontmatter
        .get("groups")
        .cloned()
        .unwrap_or_else(|| json!(["read", "edit"]));
    let text = serde_json::to_string(&value).unwrap_or_else(|_| "[]".to_string());
    (value, text)
}

fn groups_warning(item: &PortableItem) -> Vec<String> {
    match item.frontmatter.get("groups") {
        Some(value) if !value.is_array() => vec![format!(
            "frontmatter 'groups' for '{}' is not a list; passing it through as-is",
            item.name
        )],
        _ => Vec::new(),
    }
}

/// Append `key` as a stripped block scalar indented beneath a mode entry.
fn push_block_scalar(out: &mut String, key: &str, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        out.push_str(&format!("    {key}: \"\"\n"));
        return;
    }
    out.push_str(&format!("    {key}: |-\n"));
    for line in text.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str("      ");
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// Double-quoted scalar, valid in both YAML and JSON.
fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

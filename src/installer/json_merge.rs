//! Items merged into a shared JSON mode array, with one rule file per item
//! in a sibling `rules/` directory.
//!
//! Unlike the other strategies this one touches several files per call, so
//! every snapshot goes into one ordered list and any failure rolls the
//! whole batch back in reverse order. There is no partial success here.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::core::{InstallError, classify_io_error};
use crate::models::{InstallResult, PortableItem};
use crate::utils::{
    atomic_write, checksum_bytes, ensure_contained, ensure_dir, validate_item_segments,
};

use super::snapshot::restore_all_or_note;
use super::{FileSnapshot, InstallContext, MergeLock};

const MODES_ROOT_KEY: &str = "customModes";
const RULES_DIR: &str = "rules";

/// The shape every record in the mode array must have. Carried-forward
/// records are validated against this but written back from their original
/// JSON values, so fields beyond the schema survive a merge.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModeRecord {
    slug: String,
    #[allow(dead_code)]
    name: String,
    #[allow(dead_code)]
    role_definition: String,
    #[allow(dead_code)]
    groups: Vec<Value>,
    #[serde(default)]
    #[allow(dead_code)]
    custom_instructions: String,
}

/// Parses one converted item into a mode record.
///
/// A parse failure and a schema mismatch produce different messages so the
/// user can tell malformed output from a missing field.
fn parse_mode_record(item_name: &str, content: &str) -> Result<(Value, String), InstallError> {
    let value: Value = serde_json::from_str(content).map_err(|e| InstallError::ConversionFailed {
        item: item_name.to_string(),
        reason: format!("mode record is not valid JSON: {e}"),
    })?;
    let record: ModeRecord =
        serde_json::from_value(value.clone()).map_err(|e| InstallError::ConversionFailed {
            item: item_name.to_string(),
            reason: format!("mode record does not match the mode schema: {e}"),
        })?;
    Ok((value, record.slug))
}

/// Reads and schema-validates the existing mode array. A missing or blank
/// file is an empty array; anything else must parse and conform.
async fn read_existing_modes(path: &Path) -> Result<Vec<Value>, InstallError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(classify_io_error(&e, path, "reading mode file")),
    };
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let root: Value = serde_json::from_str(&text).map_err(|e| InstallError::SchemaInvalid {
        path: path.display().to_string(),
        reason: format!("not valid JSON: {e}"),
    })?;
    let modes = root
        .get(MODES_ROOT_KEY)
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| InstallError::SchemaInvalid {
            path: path.display().to_string(),
            reason: format!("missing '{MODES_ROOT_KEY}' array"),
        })?;
    for (idx, record) in modes.iter().enumerate() {
        serde_json::from_value::<ModeRecord>(record.clone()).map_err(|e| {
            InstallError::SchemaInvalid {
                path: path.display().to_string(),
                reason: format!("mode record at index {idx} does not match the mode schema: {e}"),
            }
        })?;
    }
    Ok(modes)
}

/// New records lead the array; old records keep their original values and
/// follow, minus any whose slug was just rewritten.
fn merge_mode_arrays(merged: &[(String, Value)], existing: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = merged.iter().map(|(_, value)| value.clone()).collect();
    for old in existing {
        let slug = old.get("slug").and_then(Value::as_str).unwrap_or_default();
        if !merged.iter().any(|(new_slug, _)| new_slug == slug) {
            out.push(old.clone());
        }
    }
    out
}

fn rule_target(rules_root: &Path, item: &PortableItem) -> Result<PathBuf, InstallError> {
    let relative = format!("{}.md", item.qualified_name());
    ensure_contained(&rules_root.join(&relative), rules_root)
}

fn render_rule(item: &PortableItem) -> String {
    format!("# {}\n\n{}\n", item.display_name(), item.body.trim())
}

struct PreparedMode<'i> {
    item: &'i PortableItem,
    slug: String,
    value: Value,
    record_json: String,
}

pub(super) async fn install(ctx: &InstallContext<'_>) -> InstallResult {
    let lock = match MergeLock::acquire(&ctx.base, ctx.options.lock_timeout).await {
        Ok(lock) => lock,
        Err(e) => return InstallResult::failed(ctx.provider, e.to_string()),
    };
    let result = install_locked(ctx).await;
    drop(lock);
    result
}

async fn install_locked(ctx: &InstallContext<'_>) -> InstallResult {
    let mut warnings = Vec::new();

    let rules_root = match ctx.base.parent() {
        Some(parent) => parent.join(RULES_DIR),
        None => {
            return InstallResult::failed(
                ctx.provider,
                InstallError::ValidationFailed {
                    reason: format!(
                        "mode file {} has no parent directory",
                        ctx.base.display()
                    ),
                }
                .to_string(),
            );
        }
    };

    let existing = match read_existing_modes(&ctx.base).await {
        Ok(existing) => existing,
        Err(e) => return InstallResult::failed(ctx.provider, e.to_string()),
    };

    // Validate, convert and schema-check the whole batch before the first
    // write, so most failures never need a rollback at all.
    let mut prepared: Vec<PreparedMode<'_>> = Vec::with_capacity(ctx.items.len());
    for item in ctx.items {
        if let Err(e) = validate_item_segments(&item.name, item.segments.as_deref()) {
            return InstallResult::failed(ctx.provider, e.to_string()).with_warnings(warnings);
        }
        let conversion = match ctx.converter.convert(item, ctx.format, ctx.provider) {
            Ok(conversion) => conversion,
            Err(e) => {
                warnings.extend(e.warnings);
                return InstallResult::failed(ctx.provider, e.message).with_warnings(warnings);
            }
        };
        warnings.extend(conversion.warnings);
        let (value, slug) = match parse_mode_record(&item.name, &conversion.content) {
            Ok(parsed) => parsed,
            Err(e) => {
                return InstallResult::failed(ctx.provider, e.to_string()).with_warnings(warnings);
            }
        };
        prepared.push(PreparedMode {
            item,
            slug,
            value,
            record_json: conversion.content,
        });
    }

    // Same slug twice in one batch collapses to the later record.
    let mut merged: Vec<(String, Value)> = Vec::with_capacity(prepared.len());
    for mode in &prepared {
        if let Some(slot) = merged.iter_mut().find(|(slug, _)| *slug == mode.slug) {
            slot.1 = mode.value.clone();
        } else {
            merged.push((mode.slug.clone(), mode.value.clone()));
        }
    }

    let mut root_object = serde_json::Map::new();
    root_object.insert(
        MODES_ROOT_KEY.to_string(),
        Value::Array(merge_mode_arrays(&merged, &existing)),
    );
    let root_content = match serde_json::to_string_pretty(&Value::Object(root_object)) {
        Ok(content) => format!("{content}\n"),
        Err(e) => {
            return InstallResult::failed(
                ctx.provider,
                format!("failed to encode mode file {}: {e}", ctx.base.display()),
            )
            .with_warnings(warnings);
        }
    };

    // Root file first, then one rule file per item. Every snapshot lands in
    // one list; a failure anywhere restores them newest-first.
    let mut snapshots: Vec<FileSnapshot> = Vec::new();
    if let Err(e) = write_tracked(&ctx.base, root_content.as_bytes(), true, &mut snapshots).await {
        let error = restore_all_or_note(&snapshots, e).await;
        return InstallResult::failed(ctx.provider, error).with_warnings(warnings);
    }
    let root_overwritten = snapshots.first().is_some_and(FileSnapshot::existed);

    let mut snapshotted_rules: Vec<PathBuf> = Vec::new();
    for mode in &prepared {
        let target = match rule_target(&rules_root, mode.item) {
            Ok(target) => target,
            Err(e) => {
                let error = restore_all_or_note(&snapshots, e.to_string()).await;
                return InstallResult::failed(ctx.provider, error).with_warnings(warnings);
            }
        };
        // Two items resolving to the same rule path share one snapshot so
        // rollback restores the pre-batch content, not an intermediate one.
        let needs_snapshot = !snapshotted_rules.contains(&target);
        let rendered = render_rule(mode.item);
        if let Err(e) =
            write_tracked(&target, rendered.as_bytes(), needs_snapshot, &mut snapshots).await
        {
            let error = restore_all_or_note(&snapshots, e).await;
            return InstallResult::failed(ctx.provider, error).with_warnings(warnings);
        }
        if needs_snapshot {
            snapshotted_rules.push(target);
        }
    }

    let batch_slugs: Vec<String> = merged.iter().map(|(slug, _)| slug.clone()).collect();
    let target_checksum = checksum_bytes(root_content.as_bytes());
    for mode in &prepared {
        ctx.register(
            ctx.record_for(mode.item, &ctx.base)
                .with_source(
                    mode.item.source_path.clone(),
                    Some(checksum_bytes(mode.record_json.as_bytes())),
                )
                .with_target_checksum(target_checksum.clone())
                .with_owned_sections(batch_slugs.clone()),
        );
    }

    InstallResult::success(ctx.provider, ctx.base.clone())
        .with_overwritten(root_overwritten)
        .with_warnings(warnings)
}

async fn write_tracked(
    path: &Path,
    bytes: &[u8],
    snapshot_needed: bool,
    snapshots: &mut Vec<FileSnapshot>,
) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && let Err(e) = ensure_dir(parent)
    {
        return Err(e.to_string());
    }
    if snapshot_needed {
        match FileSnapshot::capture(path).await {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => return Err(e.to_string()),
        }
    }
    atomic_write(path, bytes).map_err(|e| e.to_string())
}

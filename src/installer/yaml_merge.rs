//! Items merged into a shared `customModes:` YAML mode list.
//!
//! The file is never fed through a YAML parser and re-emitted. Entries are
//! split on their `- slug: "<name>"` marker lines and carried as raw text,
//! so hand-edited formatting and comments inside entries this tool does not
//! own survive every merge byte-for-byte. Only entries whose slug matches
//! an incoming item are replaced.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::{InstallError, classify_io_error};
use crate::models::{InstallResult, PortableItem};
use crate::utils::{atomic_write, checksum_bytes, validate_item_segments};

use super::{FileSnapshot, InstallContext, MergeLock};

const MODES_ROOT_KEY: &str = "customModes:";

/// Matches the first line of a mode entry and captures its slug, with or
/// without quotes.
fn entry_start_regex() -> &'static Regex {
    static ENTRY_START: OnceLock<Regex> = OnceLock::new();
    ENTRY_START.get_or_init(|| {
        Regex::new(r#"^\s*-\s+slug:\s*["']?([^"'\s]+)["']?\s*$"#).unwrap()
    })
}

/// One entry from an existing mode list, kept exactly as it appeared.
#[derive(Debug)]
struct RawEntry {
    slug: String,
    text: String,
}

/// An existing mode list split into the text above the first entry and the
/// entries themselves.
#[derive(Debug)]
struct ModeList {
    header: String,
    entries: Vec<RawEntry>,
}

impl ModeList {
    fn empty() -> Self {
        Self {
            header: format!("{MODES_ROOT_KEY}\n"),
            entries: Vec::new(),
        }
    }
}

/// Splits an existing file at entry-start markers.
///
/// Everything through the root key line, plus any lines before the first
/// entry, becomes the header. Lines between one entry start and the next
/// belong to the earlier entry, whatever they contain.
fn parse_mode_list(text: &str, path: &Path) -> Result<ModeList, InstallError> {
    if text.trim().is_empty() {
        return Ok(ModeList::empty());
    }

    let mut lines = text.split_inclusive('\n');
    let mut header = String::new();
    let mut found_root = false;
    for line in lines.by_ref() {
        header.push_str(line);
        if line.trim_end() == MODES_ROOT_KEY {
            found_root = true;
            break;
        }
    }
    if !found_root {
        return Err(InstallError::SchemaInvalid {
            path: path.display().to_string(),
            reason: format!("missing '{MODES_ROOT_KEY}' root key"),
        });
    }

    let mut entries: Vec<RawEntry> = Vec::new();
    for line in lines {
        if let Some(captures) = entry_start_regex().captures(line.trim_end()) {
            entries.push(RawEntry {
                slug: captures[1].to_string(),
                text: line.to_string(),
            });
        } else if let Some(current) = entries.last_mut() {
            current.text.push_str(line);
        } else {
            header.push_str(line);
        }
    }

    Ok(ModeList { header, entries })
}

struct PreparedMode<'i> {
    item: &'i PortableItem,
    slug: String,
    rendered: String,
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

    let existing = match tokio::fs::read_to_string(&ctx.base).await {
        Ok(text) => match parse_mode_list(&text, &ctx.base) {
            Ok(list) => list,
            Err(e) => return InstallResult::failed(ctx.provider, e.to_string()),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ModeList::empty(),
        Err(e) => {
            let error = classify_io_error(&e, &ctx.base, "reading mode list");
            return InstallResult::failed(ctx.provider, error.to_string());
        }
    };

    // Convert everything before touching the file; the converter's filename
    // doubles as the mode slug for this format.
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
        prepared.push(PreparedMode {
            item,
            slug: conversion.filename.clone(),
            rendered: conversion.content,
        });
    }

    // Same slug twice in one batch collapses to the later rendering.
    let mut merged: Vec<(String, String)> = Vec::with_capacity(prepared.len());
    for mode in &prepared {
        if let Some(slot) = merged.iter_mut().find(|(slug, _)| *slug == mode.slug) {
            slot.1 = mode.rendered.clone();
        } else {
            merged.push((mode.slug.clone(), mode.rendered.clone()));
        }
    }

    // Matching slugs are replaced in place; entries we do not own keep their
    // original bytes; everything else appends at the end.
    let mut output = existing.header.clone();
    let mut consumed = vec![false; merged.len()];
    for entry in &existing.entries {
        match merged.iter().position(|(slug, _)| *slug == entry.slug) {
            Some(idx) if !consumed[idx] => {
                output.push_str(&merged[idx].1);
                consumed[idx] = true;
            }
            Some(_) => {
                // A second pre-existing entry with a slug we just wrote
                // would duplicate the mode. Drop it.
                warnings.push(format!(
                    "dropped duplicate mode entry '{}' from existing file",
                    entry.slug
                ));
            }
            None => output.push_str(&entry.text),
        }
    }
    for (idx, (_, rendered)) in merged.iter().enumerate() {
        if !consumed[idx] {
            if !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(rendered);
        }
    }
    if !output.ends_with('\n') {
        output.push('\n');
    }

    let snapshot = match FileSnapshot::capture(&ctx.base).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return InstallResult::failed(ctx.provider, e.to_string()).with_warnings(warnings);
        }
    };
    if let Err(e) = atomic_write(&ctx.base, output.as_bytes()) {
        let error = snapshot.restore_or_note(e.to_string()).await;
        return InstallResult::failed(ctx.provider, error).with_warnings(warnings);
    }

    // Every item in the batch shares ownership of the full slug set written
    // by this call.
    let batch_slugs: Vec<String> = merged.iter().map(|(slug, _)| slug.clone()).collect();
    let target_checksum = checksum_bytes(output.as_bytes());
    for mode in &prepared {
        ctx.register(
            ctx.record_for(mode.item, &ctx.base)
                .with_source(
                    mode.item.source_path.clone(),
                    Some(checksum_bytes(mode.rendered.as_bytes())),
                )
                .with_target_checksum(target_checksum.clone())
                .with_owned_sections(batch_slugs.clone()),
        );
    }

    InstallResult::success(ctx.provider, ctx.base.clone())
        .with_overwritten(snapshot.existed())
        .with_warnings(warnings)
}

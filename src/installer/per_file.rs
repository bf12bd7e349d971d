//! One file per item, plus the fixed-path single-file variant.
//!
//! Per-file targets are presumed distinct per item, so no lock is taken; the
//! filesystem itself serializes nothing here. Each item is validated,
//! converted, containment-checked, and written atomically with its own
//! snapshot. Items are isolated: a failed item becomes a warning line on an
//! otherwise successful batch, and only an all-failed batch fails the
//! provider result.

use std::path::Path;

use crate::models::{InstallResult, ItemResult, PortableItem};
use crate::utils::{
    atomic_write, checksum_bytes, ensure_contained, ensure_dir, safe_canonicalize,
    validate_item_segments,
};

use super::{FileSnapshot, InstallContext};
use crate::convert::Conversion;

/// Per-item terminal state, folded into the provider result afterwards.
enum ItemOutcome {
    Installed {
        path: std::path::PathBuf,
        overwritten: bool,
        warnings: Vec<String>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
        warnings: Vec<String>,
    },
}

/// Install every item to its own file under the base directory.
pub(super) async fn install_batch(
    ctx: &InstallContext<'_>,
    nested: bool,
    total_char_limit: Option<usize>,
) -> InstallResult {
    let mut outcomes = Vec::with_capacity(ctx.items.len());
    let mut running_total = 0usize;

    for item in ctx.items {
        let outcome =
            install_item(ctx, item, nested, total_char_limit, &mut running_total).await;
        outcomes.push((item, outcome));
    }

    aggregate(ctx, outcomes)
}

/// Install one item wholesale to the fixed target file.
pub(super) async fn install_fixed(ctx: &InstallContext<'_>) -> InstallResult {
    if ctx.items.len() > 1 {
        return InstallResult::failed(
            ctx.provider,
            format!(
                "target {} holds exactly one item per install call ({} given)",
                ctx.base.display(),
                ctx.items.len()
            ),
        );
    }
    let item = &ctx.items[0];

    if let Err(e) = validate_item_segments(&item.name, item.segments.as_deref()) {
        return InstallResult::failed(ctx.provider, e.to_string());
    }
    let conversion = match ctx.converter.convert(item, ctx.format, ctx.provider) {
        Ok(conversion) => conversion,
        Err(e) => {
            return InstallResult::failed(ctx.provider, e.message).with_warnings(e.warnings);
        }
    };

    if let Some(source) = &item.source_path
        && let Ok(resolved_source) = safe_canonicalize(source)
        && safe_canonicalize(&ctx.base).is_ok_and(|resolved| resolved == resolved_source)
    {
        return InstallResult::skipped(ctx.provider, "already exists at source location");
    }

    match write_item(ctx, item, &ctx.base, &conversion).await {
        ItemOutcome::Installed {
            path,
            overwritten,
            warnings,
        } => InstallResult::success(ctx.provider, path)
            .with_overwritten(overwritten)
            .with_warnings(warnings),
        ItemOutcome::Skipped { reason } => InstallResult::skipped(ctx.provider, reason),
        ItemOutcome::Failed { error, warnings } => {
            InstallResult::failed(ctx.provider, error).with_warnings(warnings)
        }
    }
}

async fn install_item(
    ctx: &InstallContext<'_>,
    item: &PortableItem,
    nested: bool,
    total_char_limit: Option<usize>,
    running_total: &mut usize,
) -> ItemOutcome {
    if let Err(e) = validate_item_segments(&item.name, item.segments.as_deref()) {
        return ItemOutcome::Failed {
            error: e.to_string(),
            warnings: Vec::new(),
        };
    }

    let conversion = match ctx.converter.convert(item, ctx.format, ctx.provider) {
        Ok(conversion) => conversion,
        Err(e) => {
            return ItemOutcome::Failed {
                error: e.message,
                warnings: e.warnings,
            };
        }
    };

    // Namespaced names become subdirectories only where the provider reads
    // them; otherwise the separators flatten into dashes.
    let filename = if nested {
        conversion.filename.clone()
    } else {
        conversion.filename.replace('/', "-")
    };
    let target = ctx.base.join(&filename);

    let resolved_target = match ensure_contained(&target, &ctx.base) {
        Ok(resolved) => resolved,
        Err(e) => {
            return ItemOutcome::Failed {
                error: e.to_string(),
                warnings: conversion.warnings,
            };
        }
    };

    // Installing a file onto itself is a no-op, not an error.
    if let Some(source) = &item.source_path
        && safe_canonicalize(source).is_ok_and(|resolved| resolved == resolved_target)
    {
        return ItemOutcome::Skipped {
            reason: "already exists at source location".to_string(),
        };
    }

    // Aggregate budget for providers that cap total installed text.
    if let Some(cap) = total_char_limit {
        let size = conversion.content.chars().count();
        if *running_total + size > cap {
            return ItemOutcome::Skipped {
                reason: format!(
                    "item '{}' ({size} chars) would exceed the provider limit \
                     ({}/{cap} chars used)",
                    item.name, running_total
                ),
            };
        }
        *running_total += size;
    }

    write_item(ctx, item, &target, &conversion).await
}

/// Snapshot, write, checksum, register. Any failure after the snapshot
/// restores it and reports the rollback outcome alongside the error.
async fn write_item(
    ctx: &InstallContext<'_>,
    item: &PortableItem,
    target: &Path,
    conversion: &Conversion,
) -> ItemOutcome {
    if let Some(parent) = target.parent()
        && let Err(e) = ensure_dir(parent)
    {
        return ItemOutcome::Failed {
            error: e.to_string(),
            warnings: conversion.warnings.clone(),
        };
    }

    let snapshot = match FileSnapshot::capture(target).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return ItemOutcome::Failed {
                error: e.to_string(),
                warnings: conversion.warnings.clone(),
            };
        }
    };

    if let Err(e) = atomic_write(target, conversion.content.as_bytes()) {
        let error = snapshot.restore_or_note(e.to_string()).await;
        return ItemOutcome::Failed {
            error,
            warnings: conversion.warnings.clone(),
        };
    }

    // One representation on disk, so the written checksum serves as both
    // source and target.
    let checksum = checksum_bytes(conversion.content.as_bytes());
    ctx.register(
        ctx.record_for(item, target)
            .with_source(item.source_path.clone(), Some(checksum.clone()))
            .with_target_checksum(checksum),
    );

    ItemOutcome::Installed {
        path: target.to_path_buf(),
        overwritten: snapshot.existed(),
        warnings: conversion.warnings.clone(),
    }
}

/// Fold per-item outcomes into the provider result: any success carries the
/// batch, an all-failed batch concatenates its errors, an all-skipped batch
/// stays a skip.
fn aggregate(
    ctx: &InstallContext<'_>,
    outcomes: Vec<(&PortableItem, ItemOutcome)>,
) -> InstallResult {
    let mut item_results = Vec::with_capacity(outcomes.len());
    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    let mut skip_reasons = Vec::new();
    let mut any_success = false;
    let mut any_overwritten = false;

    for (item, outcome) in outcomes {
        match outcome {
            ItemOutcome::Installed {
                path,
                overwritten,
                warnings: item_warnings,
            } => {
                any_success = true;
                any_overwritten |= overwritten;
                warnings.extend(item_warnings);
                item_results.push(ItemResult {
                    name: item.name.clone(),
                    success: true,
                    path: Some(path),
                    skipped: false,
                    skip_reason: None,
                    error: None,
                });
            }
            ItemOutcome::Skipped { reason } => {
                skip_reasons.push(reason.clone());
                item_results.push(ItemResult {
                    name: item.name.clone(),
                    success: true,
                    path: None,
                    skipped: true,
                    skip_reason: Some(reason),
                    error: None,
                });
            }
            ItemOutcome::Failed {
                error,
                warnings: item_warnings,
            } => {
                warnings.extend(item_warnings);
                errors.push((item.name.clone(), error.clone()));
                item_results.push(ItemResult {
                    name: item.name.clone(),
                    success: false,
                    path: None,
                    skipped: false,
                    skip_reason: None,
                    error: Some(error),
                });
            }
        }
    }

    if any_success {
        for (name, error) in &errors {
            warnings.push(format!("failed to install '{name}': {error}"));
        }
        InstallResult::success(ctx.provider, ctx.base.clone())
            .with_overwritten(any_overwritten)
            .with_warnings(warnings)
            .with_item_results(item_results)
    } else if !errors.is_empty() {
        let message = errors
            .into_iter()
            .map(|(_, error)| error)
            .collect::<Vec<_>>()
            .join("; ");
        InstallResult::failed(ctx.provider, message)
            .with_warnings(warnings)
            .with_item_results(item_results)
    } else {
        InstallResult::skipped(ctx.provider, skip_reasons.join("; "))
            .with_item_results(item_results)
    }
}

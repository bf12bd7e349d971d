//! Items merged into one shared Markdown file as addressable sections.
//!
//! The target (a CLAUDE.md or AGENTS.md style aggregate) is parsed into
//! sections, each incoming item replaces or appends the section it owns,
//! and the document is rebuilt around everything else. The whole
//! read-merge-write span runs under the merge lock; the target is
//! snapshotted before the write and restored on failure.

use crate::core::classify_io_error;
use crate::markdown::{SectionKind, SectionedDocument};
use crate::models::{ArtifactType, InstallResult, PortableItem};
use crate::utils::{atomic_write, checksum_bytes, validate_item_segments};

use super::{FileSnapshot, InstallContext, MergeLock};

/// The section kind this artifact type lands as.
fn section_kind(artifact: ArtifactType) -> SectionKind {
    match artifact {
        ArtifactType::Rules => SectionKind::Rule,
        ArtifactType::Config => SectionKind::Config,
        _ => SectionKind::Agent,
    }
}

/// Section identity within the kind: agents go by display name, rules by
/// item name, and the config section is a singleton.
fn section_key(kind: SectionKind, item: &PortableItem) -> String {
    match kind {
        SectionKind::Rule => item.name.clone(),
        SectionKind::Config => "config".to_string(),
        _ => item.display_name().to_string(),
    }
}

fn section_heading(kind: SectionKind, key: &str) -> String {
    match kind {
        SectionKind::Rule => format!("## Rule: {key}"),
        SectionKind::Config => "## Config".to_string(),
        _ => format!("## Agent: {key}"),
    }
}

fn render_section(kind: SectionKind, key: &str, body: &str) -> String {
    let heading = section_heading(kind, key);
    let body = body.trim();
    if body.is_empty() {
        heading
    } else {
        format!("{heading}\n\n{body}")
    }
}

struct PreparedSection<'i> {
    item: &'i PortableItem,
    key: String,
    rendered: String,
}

pub(super) async fn install(ctx: &InstallContext<'_>) -> InstallResult {
    let kind = section_kind(ctx.artifact);

    // The config section is a singleton, so a batch cannot carry two.
    if kind == SectionKind::Config && ctx.items.len() > 1 {
        return InstallResult::failed(
            ctx.provider,
            format!(
                "config merges accept exactly one item per call ({} given)",
                ctx.items.len()
            ),
        );
    }

    let lock = match MergeLock::acquire(&ctx.base, ctx.options.lock_timeout).await {
        Ok(lock) => lock,
        Err(e) => return InstallResult::failed(ctx.provider, e.to_string()),
    };
    let result = install_locked(ctx, kind).await;
    drop(lock);
    result
}

async fn install_locked(ctx: &InstallContext<'_>, kind: SectionKind) -> InstallResult {
    let mut warnings = Vec::new();

    // Read and parse whatever is already there. Only a missing file is
    // treated as empty; any other read failure aborts before we touch it.
    let existing = match tokio::fs::read_to_string(&ctx.base).await {
        Ok(text) => Some(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            let error = classify_io_error(&e, &ctx.base, "reading merge target");
            return InstallResult::failed(ctx.provider, error.to_string());
        }
    };
    let mut doc = match &existing {
        Some(text) => SectionedDocument::parse(text),
        None => SectionedDocument::default(),
    };
    warnings.append(&mut doc.warnings);

    // Validate and convert everything up front; a bad item aborts the call
    // before any mutation.
    let mut rendered_items: Vec<PreparedSection<'_>> = Vec::with_capacity(ctx.items.len());
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

        let key = section_key(kind, item);
        let rendered = render_section(kind, &key, &conversion.content);
        rendered_items.push(PreparedSection {
            item,
            key,
            rendered,
        });
    }

    // Collapse batch collisions on the same key: the later item wins, like
    // a duplicate heading in the file itself.
    let mut merged: Vec<(String, String)> = Vec::with_capacity(rendered_items.len());
    for prepared in &rendered_items {
        if let Some(existing) = merged.iter_mut().find(|(key, _)| *key == prepared.key) {
            warnings.push(format!(
                "duplicate section '{}' in batch: last item wins",
                prepared.key
            ));
            existing.1 = prepared.rendered.clone();
        } else {
            merged.push((prepared.key.clone(), prepared.rendered.clone()));
        }
    }

    // Replace in place where the section already exists, append the rest.
    for (key, rendered) in merged {
        doc.upsert(kind, &key, rendered);
    }

    let snapshot = match FileSnapshot::capture(&ctx.base).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return InstallResult::failed(ctx.provider, e.to_string()).with_warnings(warnings);
        }
    };

    let serialized = doc.serialize();
    if let Err(e) = atomic_write(&ctx.base, serialized.as_bytes()) {
        let error = snapshot.restore_or_note(e.to_string()).await;
        return InstallResult::failed(ctx.provider, error).with_warnings(warnings);
    }

    // Each item owns exactly its section key, never the whole file; that is
    // what lets a later call update one item without disturbing the rest.
    let target_checksum = checksum_bytes(serialized.as_bytes());
    for prepared in &rendered_items {
        ctx.register(
            ctx.record_for(prepared.item, &ctx.base)
                .with_source(
                    prepared.item.source_path.clone(),
                    Some(checksum_bytes(prepared.rendered.as_bytes())),
                )
                .with_target_checksum(target_checksum.clone())
                .with_owned_sections(vec![prepared.key.clone()]),
        );
    }

    InstallResult::success(ctx.provider, ctx.base.clone())
        .with_overwritten(snapshot.existed())
        .with_warnings(warnings)
}

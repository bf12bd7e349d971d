//! Path validation and security utilities for CodeKit.
//!
//! Item names and namespace segments come from kit authors, not from the
//! user running the install, so they are treated as untrusted input. The
//! checks here run before any filesystem access and again on the resolved
//! target path, closing both the lexical hole (`..` segments, absolute
//! names) and the encoded one (`%2e%2e`, non-NFC lookalikes).

use anyhow::{Context, Result, anyhow};
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

use crate::core::InstallError;

/// Validates a single name or namespace segment.
///
/// A segment is rejected when it:
/// - is empty or whitespace-only
/// - equals `.` or `..`
/// - contains a path separator (`/` or `\`) or a NUL byte
/// - decodes (percent-encoding, then Unicode NFC) to something that fails
///   any of the checks above or contains `..`
///
/// The decoded re-check catches `%2e%2e` style traversal that would slip
/// past a purely lexical comparison.
pub fn validate_segment(segment: &str) -> Result<(), InstallError> {
    check_segment_text(segment, segment)?;

    let decoded = percent_decode_str(segment).decode_utf8().map_err(|_| {
        InstallError::ValidationFailed {
            reason: format!("segment '{segment}' does not percent-decode to valid UTF-8"),
        }
    })?;
    let normalized: String = decoded.nfc().collect();

    check_segment_text(&normalized, segment)?;
    if normalized.contains("..") {
        return Err(InstallError::ValidationFailed {
            reason: format!("segment '{segment}' contains a parent directory reference"),
        });
    }

    Ok(())
}

fn check_segment_text(text: &str, original: &str) -> Result<(), InstallError> {
    if text.trim().is_empty() {
        return Err(InstallError::ValidationFailed {
            reason: format!("segment '{original}' is empty"),
        });
    }
    if text == "." || text == ".." {
        return Err(InstallError::ValidationFailed {
            reason: format!("segment '{original}' is a directory reference"),
        });
    }
    if text.contains('/') || text.contains('\\') {
        return Err(InstallError::ValidationFailed {
            reason: format!("segment '{original}' contains a path separator"),
        });
    }
    if text.contains('\0') {
        return Err(InstallError::ValidationFailed {
            reason: format!("segment '{original}' contains a NUL byte"),
        });
    }
    Ok(())
}

/// Validates an item name together with its optional namespace segments.
///
/// The name may contain `/` to express nesting (each piece is validated as
/// its own segment); explicit namespace segments may not. Absolute names
/// and Windows drive prefixes are rejected outright so an item can never
/// name a location outside the target base.
pub fn validate_item_segments(name: &str, segments: Option<&[String]>) -> Result<(), InstallError> {
    if name.starts_with('/') || name.starts_with('\\') {
        return Err(InstallError::ValidationFailed {
            reason: format!("item name '{name}' must not be absolute"),
        });
    }
    if has_drive_prefix(name) {
        return Err(InstallError::ValidationFailed {
            reason: format!("item name '{name}' must not carry a drive prefix"),
        });
    }

    for piece in name.split('/') {
        validate_segment(piece)?;
    }

    if let Some(segments) = segments {
        for segment in segments {
            validate_segment(segment)?;
        }
    }

    Ok(())
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Safely canonicalizes a path, resolving as much of it as exists.
///
/// For paths that don't exist yet (the common case for install targets),
/// the nearest existing ancestor is canonicalized and the remaining
/// components are rejoined. Symlinks in the existing portion are resolved,
/// which is what makes the containment check below meaningful.
pub fn safe_canonicalize(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize path: {}", path.display()));
    }

    let mut existing = path;
    let mut tail: Vec<std::ffi::OsString> = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return Err(anyhow!("Path does not exist: {}", path.display())),
        }
    }

    let mut resolved = existing
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize ancestor of '{}'", path.display()))?;
    for name in tail.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

/// Ensures `target` resolves to `base` or a strict descendant of it.
///
/// Both paths are resolved through [`safe_canonicalize`] first, so symlinked
/// or partially non-existent targets are compared by where they would
/// actually land on disk.
///
/// # Returns
///
/// The resolved target path on success.
pub fn ensure_contained(target: &Path, base: &Path) -> Result<PathBuf, InstallError> {
    let resolved_target = safe_canonicalize(target).map_err(|e| InstallError::Other {
        message: format!("could not resolve target path: {e}"),
    })?;
    let resolved_base = safe_canonicalize(base).map_err(|e| InstallError::Other {
        message: format!("could not resolve base path: {e}"),
    })?;

    if !resolved_target.starts_with(&resolved_base) {
        return Err(InstallError::ValidationFailed {
            reason: "unsafe path: target escapes base directory".to_string(),
        });
    }

    Ok(resolved_target)
}

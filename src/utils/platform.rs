//! Platform-specific utilities and path expansion.
//!
//! Catalog paths are written as patterns (`~/.claude/agents`,
//! `$XDG_CONFIG_HOME/ck`), and [`resolve_path`] turns them into concrete
//! locations for the current user. Windows long-path handling lives here so
//! the rest of the codebase can ignore the 260-character limit.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Returns `true` when running on Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Gets the home directory path for the current user.
///
/// # Errors
///
/// Returns an error when the platform reports no home directory
/// (`USERPROFILE` unset on Windows, `HOME` unset on Unix).
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Resolves a path pattern with `~/` and environment variable expansion.
///
/// Handles:
/// - `~/` prefix expansion to the user's home directory
/// - Unix-style `$VAR` and `${VAR}` expansion via shellexpand
///
/// # Errors
///
/// Returns an error for unsupported tilde forms (`~user`) or references to
/// undefined environment variables.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = if let Some(stripped) = path.strip_prefix("~/") {
        let home = get_home_dir()?;
        home.join(stripped)
    } else if path.starts_with('~') {
        return Err(anyhow::anyhow!(
            "Invalid path: {path}\n\n\
            Tilde expansion only supports '~/' for home directory.\n\
            Use '~/' followed by a relative path, like '~/Documents/file.txt'"
        ));
    } else {
        PathBuf::from(path)
    };

    let path_str = expanded.to_string_lossy();
    let expanded_str = shellexpand::env(&path_str)
        .with_context(|| format!("Failed to expand environment variables in path: {path_str}"))?
        .into_owned();

    Ok(windows_long_path(&PathBuf::from(expanded_str)))
}

/// Location of the global config directory (`~/.config/ck` by default).
pub fn config_dir() -> Result<PathBuf> {
    if let Some(config) = dirs::config_dir() {
        return Ok(config.join("ck"));
    }
    Ok(get_home_dir()?.join(".config").join("ck"))
}

/// Converts long paths to UNC form on Windows.
///
/// Windows limits plain paths to 260 characters; the `\\?\` prefix lifts
/// that limit for absolute paths.
#[cfg(windows)]
pub fn windows_long_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if path_str.len() > 260 && !path_str.starts_with(r"\\?\") {
        let absolute_path = if path.is_relative() {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(path)
        } else {
            path.to_path_buf()
        };

        let absolute_str = absolute_path.to_string_lossy();
        if absolute_str.len() > 260 {
            if let Some(stripped) = absolute_str.strip_prefix(r"\\") {
                PathBuf::from(format!(r"\\?\UNC\{}", stripped))
            } else {
                PathBuf::from(format!(r"\\?\{}", absolute_str))
            }
        } else {
            absolute_path
        }
    } else {
        path.to_path_buf()
    }
}

/// No-op implementation of [`windows_long_path`] for non-Windows platforms.
#[cfg(not(windows))]
#[must_use]
pub fn windows_long_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_plain() {
        let resolved = resolve_path("/tmp/plain").unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/plain"));
    }

    #[test]
    fn test_resolve_path_tilde() {
        let resolved = resolve_path("~/target/dir").unwrap();
        let home = get_home_dir().unwrap();
        assert_eq!(resolved, home.join("target/dir"));
    }

    #[test]
    fn test_resolve_path_rejects_user_tilde() {
        assert!(resolve_path("~other/dir").is_err());
    }

    #[test]
    fn test_resolve_path_env_var() {
        // HOME is set in all our test environments
        #[cfg(unix)]
        {
            let resolved = resolve_path("$HOME/sub").unwrap();
            assert_eq!(resolved, get_home_dir().unwrap().join("sub"));
        }
    }

    #[test]
    fn test_config_dir_is_under_user_config() {
        let dir = config_dir().unwrap();
        assert!(dir.ends_with("ck"));
    }
}

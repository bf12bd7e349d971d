//! Error handling for CodeKit
//!
//! This module provides the error types and user-friendly error reporting for
//! the CodeKit installer. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of two main types:
//! - [`InstallError`] - Enumerated error types for all install failure cases
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! Install strategies classify raw [`std::io::Error`] values into the taxonomy
//! via [`classify_io_error`], so callers can distinguish a full disk from a
//! read-only mount without string matching. Use [`user_friendly_error`] to
//! convert any error into a displayable format with contextual suggestions.
//!
//! # Examples
//!
//! ```rust,no_run
//! use codekit_cli::core::{InstallError, user_friendly_error};
//!
//! fn guard_target() -> Result<(), InstallError> {
//!     Err(InstallError::ValidationFailed {
//!         reason: "item name 'a/../b' contains a parent directory segment".to_string(),
//!     })
//! }
//!
//! match guard_target() {
//!     Ok(_) => println!("ok"),
//!     Err(e) => {
//!         let ctx = user_friendly_error(anyhow::Error::from(e));
//!         ctx.display(); // Shows colored error with suggestions
//!     }
//! }
//! ```

use colored::Colorize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// The main error type for CodeKit install operations
///
/// Each variant represents a distinct failure mode that callers may want to
/// react to differently: a `LockTimeout` is retryable, a `ValidationFailed`
/// is a caller bug or hostile input, and a `DiskFull` needs user action.
///
/// # Error Categories
///
/// ## File System
/// - [`PermissionDenied`] - Insufficient permissions for a read or write
/// - [`DiskFull`] - No space left on the target device
/// - [`ReadOnlyFilesystem`] - Target lives on a read-only mount
/// - [`NotFound`] - A required file or directory is missing
///
/// ## Coordination
/// - [`LockTimeout`] - Merge lock could not be acquired in time
///
/// ## Input and Conversion
/// - [`ValidationFailed`] - Item name or namespace segment rejected
/// - [`ConversionFailed`] - Converter could not render an item
/// - [`SchemaInvalid`] - Existing target file has an unexpected shape
///
/// ## Catch-all
/// - [`Other`] - Anything that doesn't fit the categories above
///
/// [`PermissionDenied`]: InstallError::PermissionDenied
/// [`DiskFull`]: InstallError::DiskFull
/// [`ReadOnlyFilesystem`]: InstallError::ReadOnlyFilesystem
/// [`NotFound`]: InstallError::NotFound
/// [`LockTimeout`]: InstallError::LockTimeout
/// [`ValidationFailed`]: InstallError::ValidationFailed
/// [`ConversionFailed`]: InstallError::ConversionFailed
/// [`SchemaInvalid`]: InstallError::SchemaInvalid
/// [`Other`]: InstallError::Other
#[derive(Error, Debug, Clone)]
pub enum InstallError {
    /// Insufficient permissions to read or write a path
    ///
    /// # Fields
    /// - `operation`: What was being attempted (e.g., "write", "create directory")
    /// - `path`: The path that could not be accessed
    #[error("permission denied during {operation}: {path}")]
    PermissionDenied {
        /// What was being attempted (e.g., "write", "create directory")
        operation: String,
        /// The path that could not be accessed
        path: String,
    },

    /// No space left on the device holding the target path
    #[error("no space left on device writing {path}")]
    DiskFull {
        /// The path whose write hit ENOSPC
        path: String,
    },

    /// The target path lives on a read-only filesystem
    #[error("read-only filesystem: {path}")]
    ReadOnlyFilesystem {
        /// The path whose write hit EROFS
        path: String,
    },

    /// A required file or directory does not exist
    #[error("not found: {path}")]
    NotFound {
        /// The missing path
        path: String,
    },

    /// The merge lock could not be acquired within the timeout
    ///
    /// Another process held the lock for the entire retry window. The
    /// target file was not modified.
    #[error("failed to acquire merge lock '{lock_name}' after {timeout:?}")]
    LockTimeout {
        /// Name of the lock marker that stayed contended
        lock_name: String,
        /// How long acquisition was attempted
        timeout: Duration,
    },

    /// An item name or namespace segment failed safety validation
    ///
    /// Raised before any filesystem access, so a rejected item never
    /// touches the target tree.
    #[error("validation failed: {reason}")]
    ValidationFailed {
        /// Why the name or segment was rejected
        reason: String,
    },

    /// The converter could not render an item for the requested format
    #[error("conversion failed for '{item}': {reason}")]
    ConversionFailed {
        /// The item that failed to convert
        item: String,
        /// The converter's failure reason
        reason: String,
    },

    /// An existing target file does not have the shape a merge requires
    ///
    /// The file is left untouched; overwriting it would destroy user content
    /// the merge cannot understand.
    #[error("invalid schema in {path}: {reason}")]
    SchemaInvalid {
        /// The file whose contents were unexpected
        path: String,
        /// What was wrong with the shape
        reason: String,
    },

    /// Any failure that doesn't fit a more specific category
    #[error("{message}")]
    Other {
        /// Description of the failure
        message: String,
    },
}

/// Classifies a raw I/O error into the [`InstallError`] taxonomy.
///
/// ENOSPC and EROFS don't map onto portable [`std::io::ErrorKind`] values on
/// every platform, so the raw OS error codes are checked first.
///
/// # Arguments
/// * `error` - The I/O error to classify
/// * `path` - The path the operation was acting on
/// * `operation` - Short verb phrase for messages (e.g., "write", "snapshot")
pub fn classify_io_error(error: &std::io::Error, path: &Path, operation: &str) -> InstallError {
    if error.raw_os_error() == Some(28) {
        // ENOSPC on Unix
        return InstallError::DiskFull {
            path: path.display().to_string(),
        };
    }
    if error.raw_os_error() == Some(30) {
        // EROFS on Unix
        return InstallError::ReadOnlyFilesystem {
            path: path.display().to_string(),
        };
    }

    match error.kind() {
        std::io::ErrorKind::PermissionDenied => InstallError::PermissionDenied {
            operation: operation.to_string(),
            path: path.display().to_string(),
        },
        std::io::ErrorKind::NotFound => InstallError::NotFound {
            path: path.display().to_string(),
        },
        _ => InstallError::Other {
            message: format!("{operation} failed for {}: {error}", path.display()),
        },
    }
}

/// Rich error context for user-friendly CLI display
///
/// Wraps an [`InstallError`] with an optional actionable suggestion and
/// optional extra details. Built via [`user_friendly_error`] or manually
/// with the builder methods.
///
/// # Examples
///
/// ```rust,no_run
/// use codekit_cli::core::{InstallError, ErrorContext};
///
/// let context = ErrorContext::new(InstallError::DiskFull {
///     path: "/home/user/.claude/agents/helper.md".to_string(),
/// })
/// .with_suggestion("Free up disk space and re-run the install");
///
/// // Display with colors in terminal
/// context.display();
///
/// // Or get as string for logging
/// let message = format!("{}", context);
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying install error
    pub error: InstallError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from an [`InstallError`]
    ///
    /// This creates a basic error context with no additional suggestions or
    /// details. Use [`with_suggestion`] and [`with_details`] to add
    /// user-facing information.
    ///
    /// [`with_suggestion`]: ErrorContext::with_suggestion
    /// [`with_details`]: ErrorContext::with_details
    #[must_use]
    pub const fn new(error: InstallError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions should be actionable steps that users can take to resolve
    /// the error. They are displayed in green in the terminal.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details provide context about why the error occurred or what it means.
    /// They are displayed in yellow in the terminal.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// Prints the error in red, details in yellow, and the suggestion in
    /// green. This is the primary way the CLI presents errors to users.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {details}", "details".yellow());
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {suggestion}", "suggestion".green());
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`]
///
/// Downcasts to [`InstallError`] and [`std::io::Error`] to attach targeted
/// suggestions; anything else falls through to a generic context that still
/// shows the full message.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(install_error) = error.downcast_ref::<InstallError>() {
        return create_error_context(install_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(InstallError::PermissionDenied {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion(
                    "Try running with elevated permissions or check file ownership",
                )
                .with_details(
                    "This error occurs when CodeKit doesn't have permission to read or write files",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(InstallError::NotFound {
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    ErrorContext::new(InstallError::Other {
        message: error.to_string(),
    })
}

/// Attach suggestions and details to a typed [`InstallError`]
fn create_error_context(error: InstallError) -> ErrorContext {
    match &error {
        InstallError::PermissionDenied { path, .. } => {
            let path = path.clone();
            ErrorContext::new(error).with_suggestion(format!(
                "Check ownership and permissions of '{path}', or re-run with access to it"
            ))
        }

        InstallError::DiskFull { .. } => ErrorContext::new(error)
            .with_suggestion("Free up disk space and re-run the install")
            .with_details("The target file was rolled back to its previous contents"),

        InstallError::ReadOnlyFilesystem { .. } => ErrorContext::new(error)
            .with_suggestion("Remount the filesystem read-write or choose a different target"),

        InstallError::NotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the path exists and is spelled correctly"),

        InstallError::LockTimeout { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Another install may be running. Wait for it to finish and retry",
            )
            .with_details(
                "A stale lock file left by a crashed process is removed automatically once its holder exits",
            ),

        InstallError::ValidationFailed { .. } => ErrorContext::new(error).with_details(
            "Item names and namespace segments must stay inside the target directory",
        ),

        InstallError::ConversionFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check the item's frontmatter and body for the fields this provider requires"),

        InstallError::SchemaInvalid { path, .. } => {
            let path = path.clone();
            ErrorContext::new(error).with_suggestion(format!(
                "Inspect '{path}' and fix or remove the malformed content, then retry"
            ))
        }

        InstallError::Other { .. } => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = InstallError::LockTimeout {
            lock_name: ".settings.json.ck-merge.lock".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert!(err.to_string().starts_with("failed to acquire merge lock"));

        let err = InstallError::ValidationFailed {
            reason: "segment '..' not allowed".to_string(),
        };
        assert_eq!(err.to_string(), "validation failed: segment '..' not allowed");
    }

    #[test]
    fn test_classify_enospc() {
        let io = std::io::Error::from_raw_os_error(28);
        let err = classify_io_error(&io, Path::new("/tmp/x"), "write");
        assert!(matches!(err, InstallError::DiskFull { .. }));
    }

    #[test]
    fn test_classify_erofs() {
        let io = std::io::Error::from_raw_os_error(30);
        let err = classify_io_error(&io, Path::new("/tmp/x"), "write");
        assert!(matches!(err, InstallError::ReadOnlyFilesystem { .. }));
    }

    #[test]
    fn test_classify_permission_denied() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = classify_io_error(&io, Path::new("/etc/target"), "create directory");
        match err {
            InstallError::PermissionDenied { operation, path } => {
                assert_eq!(operation, "create directory");
                assert_eq!(path, "/etc/target");
            }
            other => panic!("expected PermissionDenied, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = classify_io_error(&io, Path::new("/tmp/missing"), "read");
        assert!(matches!(err, InstallError::NotFound { .. }));
    }

    #[test]
    fn test_classify_fallback_is_other() {
        let io = std::io::Error::new(std::io::ErrorKind::Interrupted, "interrupted");
        let err = classify_io_error(&io, Path::new("/tmp/x"), "write");
        match err {
            InstallError::Other { message } => {
                assert!(message.contains("write failed for /tmp/x"));
            }
            other => panic!("expected Other, got {other:?}"),
        }
    }

    #[test]
    fn test_user_friendly_error_downcasts_install_error() {
        let err = anyhow::Error::from(InstallError::DiskFull {
            path: "/tmp/full".to_string(),
        });
        let ctx = user_friendly_error(err);
        assert!(matches!(ctx.error, InstallError::DiskFull { .. }));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_error_context_builder() {
        let ctx = ErrorContext::new(InstallError::Other {
            message: "boom".to_string(),
        })
        .with_suggestion("try again")
        .with_details("transient");

        let rendered = ctx.to_string();
        assert!(rendered.contains("boom"));
        assert!(rendered.contains("Suggestion: try again"));
        assert!(rendered.contains("Details: transient"));
    }
}

//! Core types and functionality for CodeKit
//!
//! This module forms the foundation of CodeKit's type system. It currently
//! holds the error layer; the data model lives in [`crate::models`] and the
//! provider catalog in [`crate::providers`].
//!
//! # Error Management
//!
//! CodeKit uses an error handling system designed for both developer
//! ergonomics and end-user experience:
//! - **Strongly-typed errors** ([`InstallError`]) for precise handling in code
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions
//! - **I/O classification** ([`classify_io_error`]) mapping raw OS errors onto
//!   the install taxonomy (disk full, read-only filesystem, and so on)
//!
//! # Examples
//!
//! ```rust
//! use codekit_cli::core::{InstallError, user_friendly_error};
//!
//! fn example_operation() -> anyhow::Result<String> {
//!     Err(InstallError::NotFound { path: "items.json".to_string() }.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     friendly.display(); // Shows colored error with suggestions
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, InstallError, classify_io_error, user_friendly_error};

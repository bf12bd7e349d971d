//! Cross-platform utilities for file operations and path safety.
//!
//! Three concerns live here:
//! - [`fs`] - atomic writes, directory creation, checksums
//! - [`path_validation`] - item-name safety checks and containment
//! - [`platform`] - home directory and `~`/env expansion
//!
//! Everything the installer touches on disk goes through [`fs::atomic_write`]
//! so readers never observe a partially written file.

pub mod fs;
pub mod path_validation;
pub mod platform;

pub use fs::{atomic_write, calculate_checksum, checksum_bytes, ensure_dir, safe_write};
pub use path_validation::{ensure_contained, safe_canonicalize, validate_item_segments};
pub use platform::{get_home_dir, resolve_path};

//! Global constants used throughout the CodeKit codebase.
//!
//! This module contains timeout durations, retry parameters, and other
//! numeric constants that are used across multiple modules. Defining
//! them centrally improves maintainability and makes magic numbers
//! more discoverable.

use std::time::Duration;

/// Default timeout for merge lock acquisition (30 seconds).
///
/// Merge locks are held only for the duration of a single read-merge-write
/// cycle on one shared config file, so contention windows are short. The
/// timeout exists to surface genuinely stuck holders (a crashed process on
/// a network filesystem, for example) rather than spinning forever.
pub fn default_lock_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Maximum backoff delay for exponential backoff (500ms).
///
/// Exponential backoff delays are capped at this value to prevent
/// excessive wait times during retry operations.
pub const MAX_BACKOFF_DELAY_MS: u64 = 500;

/// Starting delay for exponential backoff (10ms).
///
/// This is the initial delay used in exponential backoff calculations,
/// which doubles on each retry attempt.
pub const STARTING_BACKOFF_DELAY_MS: u64 = 10;

/// Suffix appended to merge-lock marker file names.
///
/// A merge target `foo.yaml` is guarded by a sibling `.foo.yaml.ck-merge.lock`
/// marker so that lock scope is per target file, not per directory.
pub const MERGE_LOCK_SUFFIX: &str = ".ck-merge.lock";

/// Environment variable that overrides the global config file location.
pub const CONFIG_ENV_VAR: &str = "CK_CONFIG";

/// Checksum prefix recorded alongside installed files.
pub const CHECKSUM_PREFIX: &str = "sha256:";

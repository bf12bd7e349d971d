//! Cross-process locking around shared merge targets.
//!
//! Every strategy that rewrites a file other items also live in (the shared
//! Markdown, YAML, and JSON targets) holds one of these locks for the whole
//! read-merge-write span. The lock is advisory and process-external: a
//! marker file beside the target is locked via the OS file-locking API, so
//! two CLI invocations against the same file serialize even though they
//! share no memory.
//!
//! # Async Safety
//!
//! Lock attempts go through `spawn_blocking` so a contended lock never
//! stalls the tokio runtime.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

use crate::constants::{
    MAX_BACKOFF_DELAY_MS, MERGE_LOCK_SUFFIX, STARTING_BACKOFF_DELAY_MS, default_lock_timeout,
};
use crate::core::InstallError;

/// An exclusive lock on one shared merge target.
///
/// The marker file lives beside the target, named
/// `.<target base name>.ck-merge.lock`, and the lock is released when this
/// value is dropped.
#[derive(Debug)]
pub struct MergeLock {
    /// The file handle. The OS lock is released when this is dropped.
    _file: Arc<File>,
    /// Target base name, for tracing
    lock_name: String,
    /// Marker path, removed on drop
    lock_path: PathBuf,
}

impl Drop for MergeLock {
    fn drop(&mut self) {
        debug!(lock_name = %self.lock_name, "Merge lock released");
        // Remove the marker so lock files do not accumulate next to targets.
        if let Err(e) = std::fs::remove_file(&self.lock_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(lock_name = %self.lock_name, error = %e, "Failed to remove merge lock marker");
            }
        }
    }
}

impl MergeLock {
    /// Acquire the lock for `target` with the default timeout, or the given
    /// override.
    pub async fn acquire(target: &Path, timeout: Option<Duration>) -> Result<Self> {
        Self::acquire_with_timeout(target, timeout.unwrap_or_else(default_lock_timeout)).await
    }

    /// Acquire the lock for `target`, retrying with exponential backoff
    /// (10ms doubling up to 500ms) until `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::LockTimeout`] when the lock cannot be
    /// acquired in time. The caller sees it as a "failed to acquire merge
    /// lock" failure, never a silent unlocked write.
    pub async fn acquire_with_timeout(target: &Path, timeout: Duration) -> Result<Self> {
        let lock_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| InstallError::ValidationFailed {
                reason: format!("merge target has no file name: {}", target.display()),
            })?;
        let parent = target.parent().unwrap_or_else(|| Path::new("."));

        debug!(lock_name = %lock_name, "Waiting for merge lock");

        tokio::fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create merge target directory: {}", parent.display())
        })?;

        let lock_path = parent.join(format!(".{lock_name}{MERGE_LOCK_SUFFIX}"));

        // Open in spawn_blocking to keep slow filesystems off the runtime.
        let lock_path_clone = lock_path.clone();
        let file = tokio::task::spawn_blocking(move || {
            OpenOptions::new().create(true).write(true).truncate(false).open(&lock_path_clone)
        })
        .await
        .with_context(|| "spawn_blocking panicked")?
        .with_context(|| format!("Failed to open merge lock marker: {}", lock_path.display()))?;

        let file = Arc::new(file);
        let start = std::time::Instant::now();

        let backoff = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS)
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS));

        for delay in backoff {
            let file_clone = Arc::clone(&file);
            let lock_result = tokio::task::spawn_blocking(move || file_clone.try_lock_exclusive())
                .await
                .with_context(|| "spawn_blocking panicked")?;

            match lock_result {
                Ok(true) => {
                    debug!(
                        lock_name = %lock_name,
                        wait_ms = start.elapsed().as_millis(),
                        "Merge lock acquired"
                    );
                    return Ok(Self {
                        _file: file,
                        lock_name,
                        lock_path,
                    });
                }
                Ok(false) | Err(_) => {
                    let remaining = timeout.saturating_sub(start.elapsed());
                    if remaining.is_zero() {
                        return Err(InstallError::LockTimeout {
                            lock_name,
                            timeout,
                        }
                        .into());
                    }
                    tokio::time::sleep(delay.min(remaining)).await;
                }
            }
        }

        Err(InstallError::LockTimeout {
            lock_name,
            timeout,
        }
        .into())
    }
}

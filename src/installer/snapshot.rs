//! Pre-image capture and restoration for mutated targets.
//!
//! Strategies snapshot a file immediately before the first write to it.
//! Snapshots live only for the duration of one install call: consumed on an
//! error path, discarded on success. Restoration is byte-exact, including
//! removing a file that did not exist at capture time.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::utils::atomic_write;

/// The exact state of one file before an install mutated it.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
    existed: bool,
    content: Option<String>,
}

impl FileSnapshot {
    /// Capture `path` as it is right now.
    pub async fn capture(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Self {
                path: path.to_path_buf(),
                existed: true,
                content: Some(content),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self {
                path: path.to_path_buf(),
                existed: false,
                content: None,
            }),
            Err(e) => {
                Err(e).with_context(|| format!("failed to snapshot {}", path.display()))
            }
        }
    }

    /// Whether the file existed at capture time.
    pub fn existed(&self) -> bool {
        self.existed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Put the captured state back: rewrite the old bytes, or remove a file
    /// that did not exist.
    pub async fn restore(&self) -> Result<()> {
        match &self.content {
            Some(content) => atomic_write(&self.path, content.as_bytes())
                .with_context(|| format!("failed to restore {}", self.path.display())),
            None => match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e)
                    .with_context(|| format!("failed to remove {}", self.path.display())),
            },
        }
    }

    /// Restore, folding any restore failure into `error` as a suffix so the
    /// root cause stays first in the message.
    pub async fn restore_or_note(&self, error: String) -> String {
        match self.restore().await {
            Ok(()) => error,
            Err(e) => format!("{error}; rollback failed: {e}"),
        }
    }
}

/// Restore a batch of snapshots newest-first, collecting every restore
/// failure into the message.
pub async fn restore_all_or_note(snapshots: &[FileSnapshot], error: String) -> String {
    let mut message = error;
    for snapshot in snapshots.iter().rev() {
        if let Err(e) = snapshot.restore().await {
            message = format!("{message}; rollback failed: {e}");
        }
    }
    message
}

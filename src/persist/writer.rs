//! Snapshot writer
//!
//! Replaces the snapshot file via temp file + rename.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::{Config, SnapshotFormat};
use crate::error::{Result, StoreError};
use crate::model::Account;

use super::encode;

/// Writes full snapshots to one target path
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
    format: SnapshotFormat,
    sync: bool,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>, format: SnapshotFormat, sync: bool) -> Self {
        Self {
            path: path.into(),
            format,
            sync,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data_file, config.snapshot_format, config.sync_on_save)
    }

    /// Target snapshot path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode `accounts` and atomically replace the target
    ///
    /// Returns the number of bytes written.
    pub fn write(&self, accounts: &[Account]) -> Result<usize> {
        let bytes = encode(accounts, self.format)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        // Temp file must share the target's filesystem for rename to be atomic
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        if self.sync {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&self.path)
            .map_err(|e| StoreError::Io(e.error))?;

        tracing::trace!(path = %self.path.display(), bytes = bytes.len(), "Snapshot written");
        Ok(bytes.len())
    }
}

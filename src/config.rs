//! Configuration for SlotBook
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a SlotBook store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// Snapshot file holding every account and its reservations.
    /// Rewritten in full after each mutation.
    pub data_file: PathBuf,

    /// How the snapshot file is encoded
    pub snapshot_format: SnapshotFormat,

    /// fsync the temporary snapshot before renaming it over `data_file`
    pub sync_on_save: bool,

    // -------------------------------------------------------------------------
    // Bootstrap Configuration
    // -------------------------------------------------------------------------
    /// Administrative account guaranteed to exist after startup
    pub admin_name: String,

    /// Password given to the administrative account when it has to be created
    pub admin_password: String,
}

/// Snapshot encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Single-line JSON
    Compact,

    /// JSON indented with four spaces (human readable)
    Pretty,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./users.json"),
            snapshot_format: SnapshotFormat::Pretty,
            sync_on_save: true,
            admin_name: "admin".to_string(),
            admin_password: "password".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot file path
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_file = path.into();
        self
    }

    /// Set the snapshot encoding
    pub fn snapshot_format(mut self, format: SnapshotFormat) -> Self {
        self.config.snapshot_format = format;
        self
    }

    /// Enable or disable fsync before the snapshot rename
    pub fn sync_on_save(mut self, sync: bool) -> Self {
        self.config.sync_on_save = sync;
        self
    }

    /// Set the administrative account name
    pub fn admin_name(mut self, name: impl Into<String>) -> Self {
        self.config.admin_name = name.into();
        self
    }

    /// Set the initial administrative password
    pub fn admin_password(mut self, password: impl Into<String>) -> Self {
        self.config.admin_password = password.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

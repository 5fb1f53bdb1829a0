//! Error types for SlotBook
//!
//! Provides a unified error type for all store operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ReservationKey;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for SlotBook operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Account Errors
    // -------------------------------------------------------------------------
    #[error("An account named '{0}' already exists")]
    DuplicateName(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Account '{0}' does not exist")]
    NoSuchAccount(String),

    #[error("Incorrect password for account '{0}'")]
    WrongPassword(String),

    #[error("Password rejected: {0}")]
    WeakPassword(String),

    // -------------------------------------------------------------------------
    // Reservation Errors
    // -------------------------------------------------------------------------
    #[error("Will not add invalid reservation {0}")]
    InvalidKey(ReservationKey),

    #[error("Slot {0} is already reserved")]
    Conflict(ReservationKey),

    #[error("A day {0} days from today is out of range")]
    DayOutOfRange(i64),

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StoreError::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

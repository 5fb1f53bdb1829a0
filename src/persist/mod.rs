//! Persistence Module
//!
//! Full-state snapshots of the account list.
//!
//! ## Responsibilities
//! - Encode accounts as compact or pretty JSON
//! - Decode a snapshot file, reporting absent or malformed files as load errors
//! - Replace the snapshot file atomically
//!
//! ## File Format
//! ```text
//! [
//!     {
//!         "Name": "101",
//!         "Password": "password",
//!         "Reservations": [
//!             { "Year": 2018, "Month": 7, "Day": 28, "Slot": 2 }
//!         ]
//!     }
//! ]
//! ```
//!
//! The slot index is never written; it is derived from the lists on load.
//!
//! ## Atomicity
//! The snapshot is written to a temporary file in the target's directory,
//! optionally fsynced, then renamed over the target. A crash leaves either
//! the old or the new snapshot on disk, never a truncated one.

mod snapshot;
mod writer;

pub use snapshot::{decode, encode, read_snapshot};
pub use writer::SnapshotWriter;

//! Snapshot encoding and decoding

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::config::SnapshotFormat;
use crate::error::{Result, StoreError};
use crate::model::Account;

/// Indent used by pretty snapshots and the admin dump
const PRETTY_INDENT: &[u8] = b"    ";

/// Encode accounts in the given format
pub fn encode(accounts: &[Account], format: SnapshotFormat) -> Result<Vec<u8>> {
    match format {
        SnapshotFormat::Compact => Ok(serde_json::to_vec(accounts)?),
        SnapshotFormat::Pretty => {
            let mut buf = Vec::new();
            let formatter = PrettyFormatter::with_indent(PRETTY_INDENT);
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            accounts.serialize(&mut ser)?;
            Ok(buf)
        }
    }
}

/// Decode a snapshot; either format is accepted
pub fn decode(bytes: &[u8]) -> std::result::Result<Vec<Account>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Read and decode the snapshot at `path`
///
/// A missing file or malformed content is a [`StoreError::Load`].
pub fn read_snapshot(path: &Path) -> Result<Vec<Account>> {
    let bytes = fs::read(path).map_err(|e| StoreError::load(path, e))?;
    decode(&bytes).map_err(|e| StoreError::load(path, e))
}

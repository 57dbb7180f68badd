//! Snapshot wire format.
//!
//! Replicas exchange whole directories. A snapshot is the sender's directory
//! tagged with a schema version and the sending node; receivers join it into
//! their own state, so duplicated, reordered or stale snapshots are harmless.

use crate::error::SyncError;
use crate::Result;
use meridian_core::{serialization, NodeId};
use meridian_metadata::NamespaceDirectory;
use serde::{Deserialize, Serialize};

/// Schema written by this build; snapshots at any other schema are refused.
pub const SNAPSHOT_SCHEMA_VERSION: u16 = 1;

/// A directory in transit.
///
/// `schema_version` and `origin` lead the encoding and keep their layout
/// across schemas, so a receiver can read them before the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMessage {
    /// Schema the snapshot was written at
    pub schema_version: u16,
    /// Node that sent the snapshot
    pub origin: NodeId,
    /// Sender's directory
    pub directory: NamespaceDirectory,
}

/// Leading fields of every snapshot.
#[derive(Deserialize)]
struct SnapshotHeader {
    schema_version: u16,
    origin: NodeId,
}

impl SnapshotMessage {
    /// Snapshot of `directory` sent by `origin` at the current schema.
    pub fn new(origin: NodeId, directory: NamespaceDirectory) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            origin,
            directory,
        }
    }
}

/// Encode a snapshot, refusing to produce more than `limit` bytes.
pub fn encode_snapshot(msg: &SnapshotMessage, limit: usize) -> Result<Vec<u8>> {
    let bytes = serialization::to_vec(msg).map_err(|e| SyncError::codec(e.to_string()))?;
    if bytes.len() > limit {
        return Err(SyncError::SnapshotTooLarge {
            size: bytes.len(),
            limit,
        });
    }
    Ok(bytes)
}

/// Decode a snapshot of at most `limit` bytes written at the current schema.
pub fn decode_snapshot(bytes: &[u8], limit: usize) -> Result<SnapshotMessage> {
    if bytes.len() > limit {
        return Err(SyncError::SnapshotTooLarge {
            size: bytes.len(),
            limit,
        });
    }
    let header: SnapshotHeader =
        serialization::from_slice(bytes).map_err(|e| SyncError::codec(e.to_string()))?;
    if header.schema_version != SNAPSHOT_SCHEMA_VERSION {
        tracing::warn!(
            origin = %header.origin,
            expected = SNAPSHOT_SCHEMA_VERSION,
            found = header.schema_version,
            "Rejecting snapshot with unknown schema"
        );
        return Err(SyncError::SchemaMismatch {
            expected: SNAPSHOT_SCHEMA_VERSION,
            found: header.schema_version,
        });
    }
    serialization::from_slice(bytes).map_err(|e| SyncError::codec(e.to_string()))
}

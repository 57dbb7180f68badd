//! Sync error types

use meridian_core::MetadataError;
use meridian_metadata::DirectoryError;

/// Errors from replica ownership, snapshot exchange and configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Compare-and-swap against a generation that has moved on
    #[error("Stale replica: expected generation {expected}, found {actual}")]
    StaleReplica {
        /// Generation the caller read
        expected: u64,
        /// Generation the replica is at
        actual: u64,
    },

    /// Snapshot written by an incompatible peer
    #[error("Snapshot schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch {
        /// Schema this build writes
        expected: u16,
        /// Schema the snapshot carries
        found: u16,
    },

    /// Snapshot exceeds the configured size limit
    #[error("Snapshot too large: {size} bytes exceeds limit of {limit}")]
    SnapshotTooLarge {
        /// Encoded size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Gossip did not settle within the round budget
    #[error("No fixed point after {rounds} gossip rounds")]
    NoFixedPoint {
        /// Rounds run before giving up
        rounds: usize,
    },

    /// Snapshot could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Metadata-level failure
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// A local directory write was rejected
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl SyncError {
    /// Create a codec error
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

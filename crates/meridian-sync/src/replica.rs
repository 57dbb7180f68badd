//! Replica ownership
//!
//! [`MetadataReplica`] is the single owner of a node's directory. Local
//! writes and remote merges are serialized through one lock, and every
//! change bumps a generation counter so callers that computed a new
//! directory from an older snapshot can detect that they raced.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::wire::{decode_snapshot, encode_snapshot, SnapshotMessage};
use crate::Result;
use async_lock::RwLock;
use meridian_core::{JoinSemilattice, NamespaceId, NodeId};
use meridian_metadata::{DirectoryError, NamespaceDirectory, NamespaceInit};
use std::sync::Arc;

/// Result of joining a remote directory into the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Whether the local directory grew
    pub changed: bool,
    /// Generation after the merge
    pub generation: u64,
}

#[derive(Debug, Default)]
struct ReplicaState {
    generation: u64,
    directory: NamespaceDirectory,
}

/// A node's directory behind a lock, with a change counter.
#[derive(Debug, Clone)]
pub struct MetadataReplica {
    config: SyncConfig,
    state: Arc<RwLock<ReplicaState>>,
}

impl MetadataReplica {
    /// Empty replica.
    pub fn new(config: SyncConfig) -> Self {
        Self::with_directory(config, NamespaceDirectory::new())
    }

    /// Replica starting from a previously persisted directory.
    pub fn with_directory(config: SyncConfig, directory: NamespaceDirectory) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ReplicaState {
                generation: 0,
                directory,
            })),
        }
    }

    /// Node this replica writes as.
    pub fn node(&self) -> NodeId {
        self.config.node_id
    }

    /// Settings this replica was built with.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Current generation and a copy of the directory.
    pub async fn snapshot(&self) -> (u64, NamespaceDirectory) {
        let state = self.state.read().await;
        (state.generation, state.directory.clone())
    }

    /// Number of changes applied so far.
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Install `directory` if nothing changed since `expected`.
    ///
    /// `directory` should descend from the snapshot taken at `expected`;
    /// it replaces the stored directory outright.
    pub async fn compare_and_swap(
        &self,
        expected: u64,
        directory: NamespaceDirectory,
    ) -> Result<u64> {
        let mut state = self.state.write().await;
        if state.generation != expected {
            tracing::warn!(
                node = %self.node(),
                expected,
                actual = state.generation,
                "Rejecting stale directory swap"
            );
            return Err(SyncError::StaleReplica {
                expected,
                actual: state.generation,
            });
        }
        state.directory = directory;
        state.generation += 1;
        Ok(state.generation)
    }

    /// Join `remote` into the local directory.
    pub async fn merge_remote(&self, remote: &NamespaceDirectory) -> MergeOutcome {
        let mut state = self.state.write().await;
        let joined = state.directory.join(remote);
        let changed = joined != state.directory;
        if changed {
            state.directory = joined;
            state.generation += 1;
        }
        tracing::debug!(
            node = %self.node(),
            changed,
            generation = state.generation,
            "Merged remote directory"
        );
        MergeOutcome {
            changed,
            generation: state.generation,
        }
    }

    /// Apply a local write computed from the current directory.
    ///
    /// The lock is held across `f`, so concurrent writes on one replica are
    /// applied one after the other and never race.
    pub async fn write<F>(&self, f: F) -> Result<u64>
    where
        F: FnOnce(&NamespaceDirectory, NodeId) -> std::result::Result<NamespaceDirectory, DirectoryError>,
    {
        let mut state = self.state.write().await;
        state.directory = f(&state.directory, self.node())?;
        state.generation += 1;
        Ok(state.generation)
    }

    /// Create a namespace written by this node.
    pub async fn create_namespace(&self, init: NamespaceInit) -> NamespaceId {
        let mut state = self.state.write().await;
        let (id, next) = state.directory.create_namespace(self.node(), init);
        state.directory = next;
        state.generation += 1;
        id
    }

    /// Encode the current directory for a peer.
    pub async fn outbound(&self) -> Result<Vec<u8>> {
        let (_, directory) = self.snapshot().await;
        encode_snapshot(
            &SnapshotMessage::new(self.node(), directory),
            self.config.max_snapshot_bytes,
        )
    }

    /// Decode a peer's snapshot and merge it.
    pub async fn receive(&self, bytes: &[u8]) -> Result<MergeOutcome> {
        let msg = decode_snapshot(bytes, self.config.max_snapshot_bytes)?;
        tracing::debug!(node = %self.node(), origin = %msg.origin, size = bytes.len(), "Received snapshot");
        Ok(self.merge_remote(&msg.directory).await)
    }
}

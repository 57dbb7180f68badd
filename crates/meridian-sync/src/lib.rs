//! # Meridian Sync - Replica Ownership and Snapshot Exchange
//!
//! The boundary between the pure directory lattice and a running node:
//!
//! - [`MetadataReplica`]: serialized local writes and remote merges with a
//!   generation counter for compare-and-swap
//! - [`wire`]: versioned, size-limited snapshot encoding
//! - [`gossip`]: in-memory gossip rounds and fixed-point detection
//! - [`SyncConfig`]: replica settings from TOML and the environment
//!
//! There is no transport here; callers move snapshot bytes however they like.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod gossip;
pub mod replica;
pub mod wire;

pub use config::SyncConfig;
pub use error::SyncError;
pub use replica::{MergeOutcome, MetadataReplica};
pub use wire::{decode_snapshot, encode_snapshot, SnapshotMessage, SNAPSHOT_SCHEMA_VERSION};

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

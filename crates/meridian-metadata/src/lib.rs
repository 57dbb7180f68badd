//! # Meridian Metadata - Replicated Namespace Configuration
//!
//! The cluster-wide description of every namespace: name, port, sharding,
//! pinnings, datacenter affinities and placement. Each node holds a
//! [`NamespaceDirectory`]; directories converge by join, never by
//! coordination.
//!
//! Built on the lattice types in `meridian-core`:
//!
//! - [`NamespaceMetadata`]: record of independently versioned fields
//! - [`NamespaceDirectory`]: grow-only map of tombstoned namespaces
//! - [`NameLookup`]: tri-state name resolution that refuses to guess
//! - [`ConflictIssue`]: what an operator must resolve after a merge

#![forbid(unsafe_code)]

pub mod blueprint;
pub mod directory;
pub mod issues;
pub mod namespace;
pub mod region;

pub use blueprint::{Blueprint, BlueprintRole};
pub use directory::{DirectoryError, NameLookup, NamespaceDirectory, NamespaceEntry};
pub use issues::{ConflictIssue, ConflictKind};
pub use namespace::{
    FieldUpdate, FieldView, HeadView, NamespaceField, NamespaceInit, NamespaceMetadata,
};
pub use region::{shards_partition_universe, Region, RegionMap};

//! Meridian Core - Conflict-Free Metadata Primitives
//!
//! This crate provides the algebraic building blocks that every replicated
//! piece of cluster metadata is made from. It contains no I/O, no locking and
//! no logging: every operation is a pure function over immutable values.
//!
//! # Building Blocks
//!
//! - [`VersionedValue`]: a value tagged with causal history. Concurrent writes
//!   are kept side by side as branches instead of silently picking a winner.
//! - [`Tombstoned`]: an entity paired with a versioned present/deleted marker.
//! - [`JoinMap`]: a key to entity mapping joined key by key.
//!
//! # Semilattice Laws
//!
//! Every `join` in this crate satisfies, for all `a`, `b`, `c`:
//!
//! - Commutativity: `a ⊔ b = b ⊔ a`
//! - Associativity: `(a ⊔ b) ⊔ c = a ⊔ (b ⊔ c)`
//! - Idempotency: `a ⊔ a = a`
//!
//! Two replicas that have observed the same set of writes therefore hold
//! identical state, whatever order or multiplicity the writes arrived in.

#![forbid(unsafe_code)]

/// Join-semilattice traits
pub mod semilattice;

/// Node, namespace and placement identifiers
pub mod identifiers;

/// Vector clocks and causal comparison
pub mod clock;

/// Multi-branch causally versioned values
pub mod versioned;

/// Present/deleted wrapper with versioned deletion status
pub mod tombstoned;

/// Key-wise map join combinator
pub mod join_map;

/// Unified error handling
pub mod errors;

/// Canonical binary and JSON encodings
pub mod serialization;

pub use clock::{ClockOrdering, VectorClock};
pub use errors::MetadataError;
pub use identifiers::{DatabaseId, DatacenterId, MachineId, NamespaceId, NodeId};
pub use join_map::JoinMap;
pub use semilattice::{Bottom, CvState, JoinSemilattice};
pub use tombstoned::{Liveness, Tombstoned};
pub use versioned::{Branch, VersionedValue};

/// Standard result type for core operations
pub type Result<T> = std::result::Result<T, MetadataError>;

//! Meridian Testing Infrastructure
//!
//! Shared fixtures for the property and convergence suites of the
//! workspace crates.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! meridian-testkit = { workspace = true }
//! ```
//!
//! Then in an integration test:
//! ```rust,no_run
//! use meridian_testkit::*;
//!
//! let mut cluster = SimCluster::new(3);
//! let id = cluster.create(0, "users");
//! cluster.converge();
//! assert!(cluster.directory(2).get(&id).is_some());
//! ```

pub mod sim;
pub mod strategies;

pub use sim::{SimCluster, SimOp};
pub use strategies::*;

use meridian_core::NodeId;

/// Deterministic node id for replica index `index`.
pub fn test_node(index: usize) -> NodeId {
    NodeId::from_u128(index as u128 + 1)
}

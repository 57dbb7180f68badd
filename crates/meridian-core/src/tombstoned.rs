//! Tombstoned entities
//!
//! A [`Tombstoned`] pairs an entity with a versioned [`Liveness`] marker.
//! Deletion is just another version of the marker, so it travels through
//! joins like any other write: a delete that causally follows every known
//! version wins, while a concurrent restore survives next to it as a
//! conflict.
//!
//! Liveness and entity contents are independent axes. Joining two
//! tombstoned entities joins the markers and the entities separately, so
//! field edits made on one node are never lost to a deletion made on another
//! (and reappear if the deletion is later undone).

use crate::identifiers::NodeId;
use crate::semilattice::JoinSemilattice;
use crate::versioned::VersionedValue;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Whether an entity exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Liveness {
    /// The entity exists.
    Present,
    /// The entity was deleted.
    Deleted,
}

/// An entity with a versioned deletion marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstoned<T> {
    status: VersionedValue<Liveness>,
    value: T,
}

impl<T> Tombstoned<T> {
    /// Live entity created by `node`.
    pub fn new(value: T, node: NodeId) -> Self {
        Self {
            status: VersionedValue::new(Liveness::Present, node),
            value,
        }
    }

    /// Mark deleted, causally after every known status version.
    pub fn delete(&self, node: NodeId) -> Self
    where
        T: Clone,
    {
        self.with_status(node, Liveness::Deleted)
    }

    /// Mark present again, causally after every known status version.
    ///
    /// Also the way an operator settles a conflicted status in favour of
    /// keeping the entity.
    pub fn restore(&self, node: NodeId) -> Self
    where
        T: Clone,
    {
        self.with_status(node, Liveness::Present)
    }

    /// Versioned liveness marker, for conflict display.
    pub fn status(&self) -> &VersionedValue<Liveness> {
        &self.status
    }

    /// Whether the liveness marker has unresolved concurrent versions.
    pub fn in_conflict(&self) -> bool {
        self.status.in_conflict()
    }

    /// Whether the entity is deleted.
    ///
    /// Fails with `ValueInConflict` while delete and restore are concurrent.
    pub fn is_deleted(&self) -> Result<bool> {
        Ok(*self.status.get()? == Liveness::Deleted)
    }

    /// The entity if it is unambiguously present, `None` if unambiguously
    /// deleted.
    pub fn get(&self) -> Result<Option<&T>> {
        Ok((!self.is_deleted()?).then_some(&self.value))
    }

    /// The entity contents regardless of liveness.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Copy with the entity contents replaced by `f(contents)`; liveness is
    /// untouched.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Self {
        Self {
            status: self.status.clone(),
            value: f(&self.value),
        }
    }

    fn with_status(&self, node: NodeId, liveness: Liveness) -> Self
    where
        T: Clone,
    {
        Self {
            status: self.status.advance(node, liveness),
            value: self.value.clone(),
        }
    }
}

impl<T: JoinSemilattice> JoinSemilattice for Tombstoned<T> {
    fn join(&self, other: &Self) -> Self {
        Self {
            status: self.status.join(&other.status),
            value: self.value.join(&other.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MetadataError;

    fn node(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    fn entity(name: &str) -> Tombstoned<VersionedValue<String>> {
        Tombstoned::new(VersionedValue::new(name.to_string(), node(1)), node(1))
    }

    #[test]
    fn new_entity_is_present() {
        let e = entity("users");
        assert!(!e.is_deleted().unwrap());
        assert_eq!(e.get().unwrap().unwrap().get().unwrap(), "users");
    }

    #[test]
    fn delete_dominates_prior_versions() {
        let e = entity("users");
        let deleted = e.delete(node(2));
        assert!(deleted.is_deleted().unwrap());
        assert!(deleted.get().unwrap().is_none());

        let joined = deleted.join(&e);
        assert!(!joined.in_conflict());
        assert!(joined.is_deleted().unwrap());
        assert_eq!(joined, deleted);
    }

    #[test]
    fn concurrent_delete_and_restore_conflict() {
        let e = entity("users");
        let joined = e.delete(node(1)).join(&e.restore(node(2)));

        assert!(joined.in_conflict());
        assert_eq!(
            joined.is_deleted().unwrap_err(),
            MetadataError::value_in_conflict(2)
        );
        assert!(joined.get().is_err());

        let settled = joined.delete(node(3));
        assert!(settled.is_deleted().unwrap());
    }

    #[test]
    fn edits_survive_concurrent_delete() {
        let e = entity("users");
        let renamed = e.update(|name| name.advance(node(2), "accounts".to_string()));
        let deleted = e.delete(node(1));

        let joined = renamed.join(&deleted);
        assert!(joined.is_deleted().unwrap());
        assert_eq!(joined.value().get().unwrap(), "accounts");
    }
}

//! The namespace directory
//!
//! Every node holds a [`NamespaceDirectory`]: all namespaces the node knows
//! of, keyed by id, each wrapped in a [`Tombstoned`] so deletions replicate.
//! Nodes converge by joining directories; entries are never removed.
//!
//! Writes return a new directory instead of mutating in place. The process
//! owning the directory decides when to store the result.

use crate::namespace::{FieldUpdate, NamespaceInit, NamespaceMetadata};
use meridian_core::{
    Bottom, CvState, JoinMap, JoinSemilattice, MetadataError, NamespaceId, NodeId, Tombstoned,
};
use serde::{Deserialize, Serialize};

/// A namespace together with its deletion marker.
pub type NamespaceEntry = Tombstoned<NamespaceMetadata>;

/// Errors raised by directory writes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// No entry with this id has ever been seen
    #[error("Unknown namespace: {0}")]
    UnknownNamespace(NamespaceId),

    /// The entry is deleted; it must be restored before editing
    #[error("Namespace is deleted: {0}")]
    NamespaceDeleted(NamespaceId),

    /// Field-level failure, including unresolved deletion status
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Result of [`NamespaceDirectory::get_namespace_by_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameLookup<'a> {
    /// No live namespace has the name.
    NotFound,
    /// Exactly one live namespace has the name.
    Found(NamespaceId, &'a NamespaceEntry),
    /// The answer cannot be trusted: some entry has unresolved deletion
    /// status or name, or several live namespaces share the name.
    Unknown,
}

impl<'a> NameLookup<'a> {
    /// The match, if the lookup succeeded.
    pub fn found(self) -> Option<(NamespaceId, &'a NamespaceEntry)> {
        match self {
            NameLookup::Found(id, entry) => Some((id, entry)),
            NameLookup::NotFound | NameLookup::Unknown => None,
        }
    }

    /// Whether the lookup produced a unique match.
    pub fn is_found(&self) -> bool {
        matches!(self, NameLookup::Found(..))
    }
}

/// All namespaces known to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDirectory {
    namespaces: JoinMap<NamespaceId, NamespaceEntry>,
}

impl NamespaceDirectory {
    /// Empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a namespace under a fresh id.
    pub fn create_namespace(&self, node: NodeId, init: NamespaceInit) -> (NamespaceId, Self) {
        let id = NamespaceId::generate();
        (id, self.create_namespace_with_id(id, node, init))
    }

    /// Create a namespace under a caller-chosen id.
    ///
    /// The id must be fresh; reusing one joins the new entry into the old.
    pub fn create_namespace_with_id(
        &self,
        id: NamespaceId,
        node: NodeId,
        init: NamespaceInit,
    ) -> Self {
        tracing::info!(namespace = %id, node = %node, name = %init.name, "Creating namespace");
        let mut next = self.clone();
        next.insert_with_id(id, Tombstoned::new(NamespaceMetadata::new(node, init), node));
        next
    }

    /// Join `entry` into the slot for `id`.
    pub fn insert_with_id(&mut self, id: NamespaceId, entry: NamespaceEntry) {
        self.namespaces.merge_entry(id, entry);
    }

    /// Tombstone a namespace.
    pub fn delete_namespace(&self, id: NamespaceId, node: NodeId) -> Result<Self, DirectoryError> {
        let entry = self.entry(id)?;
        tracing::info!(namespace = %id, node = %node, "Deleting namespace");
        Ok(self.with_entry(id, entry.delete(node)))
    }

    /// Undo a deletion, or settle a conflicted deletion in favour of keeping.
    pub fn restore_namespace(&self, id: NamespaceId, node: NodeId) -> Result<Self, DirectoryError> {
        let entry = self.entry(id)?;
        tracing::info!(namespace = %id, node = %node, "Restoring namespace");
        Ok(self.with_entry(id, entry.restore(node)))
    }

    /// Advance one field of a live namespace.
    pub fn update_namespace(
        &self,
        id: NamespaceId,
        node: NodeId,
        update: FieldUpdate,
    ) -> Result<Self, DirectoryError> {
        let entry = self.entry(id)?;
        if entry.is_deleted()? {
            return Err(DirectoryError::NamespaceDeleted(id));
        }
        let field = update.field();
        let metadata = entry.value().apply(node, update)?;
        tracing::debug!(namespace = %id, node = %node, field = %field, "Advanced namespace field");
        Ok(self.with_entry(id, entry.update(|_| metadata)))
    }

    /// Entry for `id`, deleted or not.
    pub fn get(&self, id: &NamespaceId) -> Option<&NamespaceEntry> {
        self.namespaces.get(id)
    }

    /// All entries, including deleted ones, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&NamespaceId, &NamespaceEntry)> {
        self.namespaces.iter()
    }

    /// Entries whose deletion status is resolved to present.
    pub fn live(&self) -> impl Iterator<Item = (&NamespaceId, &NamespaceMetadata)> {
        self.namespaces
            .iter()
            .filter_map(|(id, entry)| entry.get().ok().flatten().map(|metadata| (id, metadata)))
    }

    /// Number of entries, including deleted ones.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Whether no namespace was ever created.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Find the namespace called `name`.
    ///
    /// Conservative by design: a single entry anywhere in the directory with
    /// conflicted deletion status or a conflicted name makes the answer
    /// [`NameLookup::Unknown`], as does more than one live match. Entries
    /// that are unambiguously deleted are skipped.
    pub fn get_namespace_by_name(&self, name: &str) -> NameLookup<'_> {
        let mut found = None;
        for (id, entry) in self.namespaces.iter() {
            match entry.is_deleted() {
                Ok(true) => continue,
                Ok(false) => {}
                Err(_) => return NameLookup::Unknown,
            }
            let Ok(entry_name) = entry.value().name.get() else {
                return NameLookup::Unknown;
            };
            if entry_name == name {
                if found.is_some() {
                    return NameLookup::Unknown;
                }
                found = Some((*id, entry));
            }
        }
        match found {
            Some((id, entry)) => NameLookup::Found(id, entry),
            None => NameLookup::NotFound,
        }
    }

    fn entry(&self, id: NamespaceId) -> Result<&NamespaceEntry, DirectoryError> {
        self.namespaces
            .get(&id)
            .ok_or(DirectoryError::UnknownNamespace(id))
    }

    fn with_entry(&self, id: NamespaceId, entry: NamespaceEntry) -> Self {
        let mut next = self.clone();
        next.insert_with_id(id, entry);
        next
    }
}

impl JoinSemilattice for NamespaceDirectory {
    fn join(&self, other: &Self) -> Self {
        Self {
            namespaces: self.namespaces.join(&other.namespaces),
        }
    }
}

impl Bottom for NamespaceDirectory {
    fn bottom() -> Self {
        Self::new()
    }
}

impl CvState for NamespaceDirectory {}

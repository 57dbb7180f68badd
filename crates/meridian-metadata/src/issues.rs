//! Conflict reporting
//!
//! Operators resolve conflicts by hand, so the directory lists every place a
//! merge left more than one current version.

use crate::directory::NamespaceDirectory;
use crate::namespace::NamespaceField;
use meridian_core::NamespaceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What is in conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Concurrent delete and restore
    Deletion,
    /// Concurrent writes to one field
    Field(NamespaceField),
}

/// A conflict awaiting operator resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConflictIssue {
    /// Affected namespace
    pub namespace_id: NamespaceId,
    /// Conflicted part of it
    pub kind: ConflictKind,
}

impl fmt::Display for ConflictIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConflictKind::Deletion => {
                write!(f, "namespace {}: deleted and restored concurrently", self.namespace_id)
            }
            ConflictKind::Field(field) => {
                write!(f, "namespace {}: field `{field}` is in conflict", self.namespace_id)
            }
        }
    }
}

impl NamespaceDirectory {
    /// Every unresolved conflict, in namespace order.
    ///
    /// Field conflicts of deleted namespaces are not reported; they come back
    /// if the namespace is restored.
    pub fn conflicts(&self) -> Vec<ConflictIssue> {
        let mut issues = Vec::new();
        for (id, entry) in self.iter() {
            match entry.is_deleted() {
                Ok(true) => {}
                Ok(false) => issues.extend(entry.value().conflicted_fields().into_iter().map(
                    |field| ConflictIssue {
                        namespace_id: *id,
                        kind: ConflictKind::Field(field),
                    },
                )),
                Err(_) => issues.push(ConflictIssue {
                    namespace_id: *id,
                    kind: ConflictKind::Deletion,
                }),
            }
        }
        issues
    }
}

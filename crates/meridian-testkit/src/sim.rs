//! In-memory replica cluster
//!
//! Each replica owns a directory and writes as its own node. Replicas only
//! learn about each other through [`SimCluster::sync`], so any interleaving
//! of concurrent edits and partial gossip can be scripted or generated.

use crate::test_node;
use meridian_core::{JoinSemilattice, NamespaceId, NodeId};
use meridian_metadata::{DirectoryError, FieldUpdate, NamespaceDirectory, NamespaceInit};

/// A scripted cluster action.
///
/// Namespaces are addressed by `slot`: an index, modulo the number of known
/// entries, into the ids the acting replica currently knows. Actions on a
/// replica that knows no namespace are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimOp {
    /// Create a namespace
    Create { replica: usize, name: String },
    /// Rename a namespace
    Rename {
        replica: usize,
        slot: usize,
        name: String,
    },
    /// Change a namespace's port
    SetPort {
        replica: usize,
        slot: usize,
        port: u16,
    },
    /// Delete a namespace
    Delete { replica: usize, slot: usize },
    /// Restore a namespace
    Restore { replica: usize, slot: usize },
    /// `to` joins the directory of `from`
    Sync { from: usize, to: usize },
}

#[derive(Debug, Clone)]
struct SimReplica {
    node: NodeId,
    directory: NamespaceDirectory,
}

/// Replicas that exchange directories only when told to.
#[derive(Debug, Clone)]
pub struct SimCluster {
    replicas: Vec<SimReplica>,
    next_id: u128,
}

impl SimCluster {
    /// Cluster of `size` empty replicas.
    pub fn new(size: usize) -> Self {
        Self {
            replicas: (0..size)
                .map(|index| SimReplica {
                    node: test_node(index),
                    directory: NamespaceDirectory::new(),
                })
                .collect(),
            next_id: 1,
        }
    }

    /// Number of replicas.
    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    /// Whether the cluster has no replicas.
    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    /// Node id replica `replica` writes as.
    pub fn node(&self, replica: usize) -> NodeId {
        self.replicas[replica].node
    }

    /// Current directory of `replica`.
    pub fn directory(&self, replica: usize) -> &NamespaceDirectory {
        &self.replicas[replica].directory
    }

    /// Copies of every replica's directory.
    pub fn directories(&self) -> Vec<NamespaceDirectory> {
        self.replicas
            .iter()
            .map(|replica| replica.directory.clone())
            .collect()
    }

    /// Create a namespace on `replica` with a fresh deterministic id.
    pub fn create(&mut self, replica: usize, name: &str) -> NamespaceId {
        let id = NamespaceId::from_u128(self.next_id);
        self.next_id += 1;
        let r = &mut self.replicas[replica];
        r.directory = r
            .directory
            .create_namespace_with_id(id, r.node, NamespaceInit::new(name));
        id
    }

    /// Rename a namespace on `replica`.
    pub fn rename(&mut self, replica: usize, id: NamespaceId, name: &str) -> Result<(), DirectoryError> {
        self.update(replica, id, FieldUpdate::Name(name.to_string()))
    }

    /// Change a namespace's port on `replica`.
    pub fn set_port(&mut self, replica: usize, id: NamespaceId, port: u16) -> Result<(), DirectoryError> {
        self.update(replica, id, FieldUpdate::Port(port))
    }

    /// Write any operator field on `replica`.
    pub fn update(
        &mut self,
        replica: usize,
        id: NamespaceId,
        update: FieldUpdate,
    ) -> Result<(), DirectoryError> {
        let r = &mut self.replicas[replica];
        r.directory = r.directory.update_namespace(id, r.node, update)?;
        Ok(())
    }

    /// Delete a namespace on `replica`.
    pub fn delete(&mut self, replica: usize, id: NamespaceId) -> Result<(), DirectoryError> {
        let r = &mut self.replicas[replica];
        r.directory = r.directory.delete_namespace(id, r.node)?;
        Ok(())
    }

    /// Restore a namespace on `replica`.
    pub fn restore(&mut self, replica: usize, id: NamespaceId) -> Result<(), DirectoryError> {
        let r = &mut self.replicas[replica];
        r.directory = r.directory.restore_namespace(id, r.node)?;
        Ok(())
    }

    /// Replica `to` joins the directory of replica `from`.
    pub fn sync(&mut self, from: usize, to: usize) {
        let incoming = self.replicas[from].directory.clone();
        self.replicas[to].directory.join_assign(&incoming);
    }

    /// Every replica joins every other, leaving all directories equal.
    pub fn converge(&mut self) {
        let all = self
            .replicas
            .iter()
            .fold(NamespaceDirectory::new(), |acc, replica| acc.join(&replica.directory));
        for replica in &mut self.replicas {
            replica.directory = all.clone();
        }
    }

    /// Run a scripted action. Writes the directory rejects are skipped.
    pub fn apply(&mut self, op: &SimOp) {
        match op {
            SimOp::Create { replica, name } => {
                self.create(*replica, name);
            }
            SimOp::Rename {
                replica,
                slot,
                name,
            } => {
                if let Some(id) = self.slot(*replica, *slot) {
                    let _ = self.rename(*replica, id, name);
                }
            }
            SimOp::SetPort {
                replica,
                slot,
                port,
            } => {
                if let Some(id) = self.slot(*replica, *slot) {
                    let _ = self.set_port(*replica, id, *port);
                }
            }
            SimOp::Delete { replica, slot } => {
                if let Some(id) = self.slot(*replica, *slot) {
                    let _ = self.delete(*replica, id);
                }
            }
            SimOp::Restore { replica, slot } => {
                if let Some(id) = self.slot(*replica, *slot) {
                    let _ = self.restore(*replica, id);
                }
            }
            SimOp::Sync { from, to } => self.sync(*from, *to),
        }
    }

    fn slot(&self, replica: usize, slot: usize) -> Option<NamespaceId> {
        let directory = &self.replicas[replica].directory;
        if directory.is_empty() {
            return None;
        }
        directory
            .iter()
            .nth(slot % directory.len())
            .map(|(id, _)| *id)
    }
}

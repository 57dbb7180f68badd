//! Vector clocks for causal ordering
//!
//! A clock maps each [`NodeId`] to the number of writes that node has made to
//! the value the clock is attached to. Missing entries count as zero. Clocks
//! never read physical time; callers supply the node performing a write.

use crate::identifiers::NodeId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Causal relationship between two vector clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockOrdering {
    /// Identical counters for every node.
    Equal,
    /// `self` happened strictly before `other`.
    Before,
    /// `self` happened strictly after `other`.
    After,
    /// Neither precedes the other.
    Concurrent,
}

/// Per-node write counters.
///
/// Zero counters are never stored, so two clocks describing the same history
/// are structurally equal. Decoding drops them too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VectorClock(BTreeMap<NodeId, u64>);

impl VectorClock {
    /// Empty clock (no writes observed).
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Clock recording exactly one write by `node`.
    pub fn single(node: NodeId) -> Self {
        Self::new().incremented(node)
    }

    /// Counter for `node` (0 when absent).
    pub fn get(&self, node: &NodeId) -> u64 {
        self.0.get(node).copied().unwrap_or(0)
    }

    /// Whether no writes have been observed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the non-zero counters.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &u64)> {
        self.0.iter()
    }

    /// Record one more write by `node`.
    pub fn increment(&mut self, node: NodeId) {
        let counter = self.0.entry(node).or_insert(0);
        *counter = counter.saturating_add(1);
    }

    /// Copy of this clock with one more write by `node`.
    pub fn incremented(&self, node: NodeId) -> Self {
        let mut next = self.clone();
        next.increment(node);
        next
    }

    /// Element-wise maximum (least upper bound) of two clocks.
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.0.clone();
        for (node, &count) in &other.0 {
            let entry = merged.entry(*node).or_insert(0);
            if count > *entry {
                *entry = count;
            }
        }
        Self(merged)
    }

    /// Causal comparison.
    pub fn compare(&self, other: &Self) -> ClockOrdering {
        let mut le = true;
        let mut ge = true;

        for node in self.0.keys().chain(other.0.keys()) {
            let a = self.get(node);
            let b = other.get(node);
            if a > b {
                le = false;
            }
            if a < b {
                ge = false;
            }
        }

        match (le, ge) {
            (true, true) => ClockOrdering::Equal,
            (true, false) => ClockOrdering::Before,
            (false, true) => ClockOrdering::After,
            (false, false) => ClockOrdering::Concurrent,
        }
    }

    /// `self[n] >= other[n]` for every node and strictly greater for at least one.
    pub fn dominates(&self, other: &Self) -> bool {
        self.compare(other) == ClockOrdering::After
    }

    /// Whether neither clock precedes the other.
    pub fn is_concurrent_with(&self, other: &Self) -> bool {
        self.compare(other) == ClockOrdering::Concurrent
    }
}

impl FromIterator<(NodeId, u64)> for VectorClock {
    fn from_iter<I: IntoIterator<Item = (NodeId, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|(_, count)| *count > 0).collect())
    }
}

impl<'de> Deserialize<'de> for VectorClock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let counters = BTreeMap::<NodeId, u64>::deserialize(deserializer)?;
        Ok(counters.into_iter().collect())
    }
}

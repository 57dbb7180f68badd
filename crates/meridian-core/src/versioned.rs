//! Causally versioned values
//!
//! A [`VersionedValue`] is an antichain of branches: every branch pairs a
//! vector clock with a value, and no branch's clock dominates another's.
//! Joining two versioned values keeps the maximal branches of their union, so
//! a write that causally follows another replaces it while truly concurrent
//! writes survive side by side until someone resolves them with
//! [`VersionedValue::advance`].
//!
//! Branches that carry equal values are reported as a single head (see
//! [`VersionedValue::heads`]) whose clock is the join of theirs; they are not
//! a conflict. The stored antichain keeps them apart so that the join stays
//! associative.

use crate::clock::VectorClock;
use crate::errors::MetadataError;
use crate::identifiers::NodeId;
use crate::semilattice::JoinSemilattice;
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One causal version of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Branch<T> {
    /// Causal history of this version
    pub clock: VectorClock,
    /// The value written
    pub value: T,
}

impl<T> Branch<T> {
    /// Create a branch.
    pub fn new(clock: VectorClock, value: T) -> Self {
        Self { clock, value }
    }
}

/// A value with multi-branch causal history.
///
/// Branches are kept sorted and deduplicated, so two versioned values are
/// equal exactly when their branch sets are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VersionedValue<T> {
    branches: Vec<Branch<T>>,
}

impl<T: Ord> VersionedValue<T> {
    /// Fresh value written once by `node` (clock `{node: 1}`).
    pub fn new(initial: T, node: NodeId) -> Self {
        Self {
            branches: vec![Branch::new(VectorClock::single(node), initial)],
        }
    }

    /// Rebuild from raw branches, pruning dominated ones.
    ///
    /// Fails on an empty branch list: a versioned value always holds at least
    /// one branch.
    pub fn from_branches(branches: Vec<Branch<T>>) -> Result<Self> {
        if branches.is_empty() {
            return Err(MetadataError::invalid(
                "a versioned value needs at least one branch",
            ));
        }
        Ok(Self {
            branches: maximal_branches(branches),
        })
    }

    /// Raw branch antichain, sorted.
    pub fn branches(&self) -> &[Branch<T>] {
        &self.branches
    }

    /// Distinct concurrent values, each with the join of the clocks that
    /// carry it. Sorted by value.
    pub fn heads(&self) -> Vec<Branch<&T>> {
        let mut heads: BTreeMap<&T, VectorClock> = BTreeMap::new();
        for branch in &self.branches {
            heads
                .entry(&branch.value)
                .and_modify(|clock| *clock = clock.merge(&branch.clock))
                .or_insert_with(|| branch.clock.clone());
        }
        heads
            .into_iter()
            .map(|(value, clock)| Branch::new(clock, value))
            .collect()
    }

    /// Distinct concurrent values, sorted.
    pub fn values(&self) -> Vec<&T> {
        self.branches
            .iter()
            .map(|branch| &branch.value)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Whether more than one distinct value survives.
    pub fn in_conflict(&self) -> bool {
        self.conflict_width() > 1
    }

    /// The resolved value.
    ///
    /// Fails with [`MetadataError::ValueInConflict`] while concurrent
    /// branches disagree.
    pub fn get(&self) -> Result<&T> {
        match self.conflict_width() {
            1 => Ok(&self.branches[0].value),
            width => Err(MetadataError::value_in_conflict(width)),
        }
    }

    /// Join of every branch clock: the full causal history of this value.
    pub fn clock(&self) -> VectorClock {
        self.branches
            .iter()
            .fold(VectorClock::new(), |acc, branch| acc.merge(&branch.clock))
    }

    /// New single-branch value written by `node` causally after every
    /// existing branch.
    ///
    /// This is how a conflict is resolved: the result dominates all current
    /// branches, so it replaces them wherever it is joined.
    pub fn advance(&self, node: NodeId, value: T) -> Self {
        Self {
            branches: vec![Branch::new(self.clock().incremented(node), value)],
        }
    }

    fn conflict_width(&self) -> usize {
        match self.branches.as_slice() {
            [] | [_] => self.branches.len(),
            _ => self.values().len(),
        }
    }
}

impl<T: Clone + Ord> JoinSemilattice for VersionedValue<T> {
    fn join(&self, other: &Self) -> Self {
        let union = self
            .branches
            .iter()
            .chain(other.branches.iter())
            .cloned()
            .collect();
        Self {
            branches: maximal_branches(union),
        }
    }
}

/// Unwritten default: one branch with an empty clock, dominated by any write.
impl<T: Default> Default for VersionedValue<T> {
    fn default() -> Self {
        Self {
            branches: vec![Branch::new(VectorClock::new(), T::default())],
        }
    }
}

impl<'de, T> Deserialize<'de> for VersionedValue<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<T> {
            branches: Vec<Branch<T>>,
        }

        let raw = Raw::<T>::deserialize(deserializer)?;
        Self::from_branches(raw.branches).map_err(serde::de::Error::custom)
    }
}

/// Sort, deduplicate and drop every branch whose clock is strictly dominated.
fn maximal_branches<T: Ord>(mut branches: Vec<Branch<T>>) -> Vec<Branch<T>> {
    branches.sort();
    branches.dedup();

    let dominated: Vec<bool> = branches
        .iter()
        .map(|candidate| {
            branches
                .iter()
                .any(|other| other.clock.dominates(&candidate.clock))
        })
        .collect();

    branches
        .into_iter()
        .zip(dominated)
        .filter_map(|(branch, dominated)| (!dominated).then_some(branch))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization;

    fn node(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    #[test]
    fn fresh_value_has_one_branch() {
        let value = VersionedValue::new("users".to_string(), node(1));
        assert_eq!(value.branches().len(), 1);
        assert!(!value.in_conflict());
        assert_eq!(value.get().unwrap(), "users");
        assert_eq!(value.clock(), VectorClock::single(node(1)));
    }

    #[test]
    fn concurrent_advances_conflict() {
        let base = VersionedValue::new("users".to_string(), node(1));
        let a = base.advance(node(1), "accounts".to_string());
        let b = base.advance(node(2), "people".to_string());

        let joined = a.join(&b);
        assert!(joined.in_conflict());
        assert_eq!(
            joined.get().unwrap_err(),
            MetadataError::value_in_conflict(2)
        );
        assert_eq!(joined.values(), vec!["accounts", "people"]);
    }

    #[test]
    fn advance_resolves_conflict() {
        let base = VersionedValue::new(1u16, node(1));
        let joined = base.advance(node(1), 2).join(&base.advance(node(2), 3));
        assert!(joined.in_conflict());

        let resolved = joined.advance(node(3), 4);
        assert!(!resolved.in_conflict());
        assert_eq!(*resolved.get().unwrap(), 4);
        assert!(resolved.clock().dominates(&joined.clock()));

        // The resolution replaces both branches wherever it lands.
        assert_eq!(resolved.join(&joined), resolved);
    }

    #[test]
    fn later_write_replaces_earlier() {
        let old = VersionedValue::new(10u32, node(1));
        let new = old.advance(node(2), 20);
        assert_eq!(old.join(&new), new);
        assert_eq!(new.join(&old), new);
    }

    #[test]
    fn equal_concurrent_values_collapse_into_one_head() {
        let base = VersionedValue::new(1u8, node(1));
        let a = base.advance(node(1), 5);
        let b = base.advance(node(2), 5);

        let joined = a.join(&b);
        assert_eq!(joined.branches().len(), 2);
        assert!(!joined.in_conflict());
        assert_eq!(*joined.get().unwrap(), 5);

        let heads = joined.heads();
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].clock, a.clock().merge(&b.clock()));
    }

    #[test]
    fn equal_clocks_with_different_values_conflict() {
        let a = VersionedValue::new("x".to_string(), node(1));
        let b = VersionedValue::new("y".to_string(), node(1));
        assert!(a.join(&b).in_conflict());
    }

    #[test]
    fn default_is_dominated_by_any_write() {
        let unwritten = VersionedValue::<String>::default();
        let written = unwritten.advance(node(4), "db".to_string());
        assert_eq!(unwritten.join(&written), written);
    }

    #[test]
    fn from_branches_rejects_empty() {
        assert!(VersionedValue::<u8>::from_branches(Vec::new()).is_err());
    }

    #[test]
    fn decoding_restores_antichain() {
        let old = Branch::new(VectorClock::single(node(1)), 1u8);
        let new = Branch::new(VectorClock::single(node(1)).incremented(node(1)), 2u8);
        let json = format!(
            r#"{{"branches":[{},{}]}}"#,
            serde_json::to_string(&new).unwrap(),
            serde_json::to_string(&old).unwrap()
        );
        let decoded: VersionedValue<u8> = serialization::from_json(&json).unwrap();
        assert_eq!(decoded.branches(), &[new]);
    }

    #[test]
    fn decoding_merges_branches_that_differ_only_by_zero_counters() {
        let json = format!(
            r#"{{"branches":[{{"clock":{{"{}":0}},"value":1}},{{"clock":{{}},"value":1}}]}}"#,
            node(1)
        );
        let decoded: VersionedValue<u8> = serialization::from_json(&json).unwrap();
        let clean = VersionedValue::from_branches(vec![Branch::new(VectorClock::new(), 1u8)]).unwrap();
        assert_eq!(decoded.branches().len(), 1);
        assert_eq!(decoded, clean);
    }
}

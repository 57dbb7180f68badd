//! Key-wise map join
//!
//! [`JoinMap`] lifts any [`JoinSemilattice`] value type to a map: the join of
//! two maps has the union of their keys, and values under a shared key are
//! joined. A missing key behaves as the identity, so an empty map is the
//! bottom element.
//!
//! Keys are never removed. Removing a key would let an older snapshot bring
//! it back on the next join; entities that should disappear are tombstoned
//! instead (see [`crate::Tombstoned`]).

use crate::semilattice::{Bottom, CvState, JoinSemilattice};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Grow-only map joined key by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "K: Serialize, V: Serialize",
    deserialize = "K: Deserialize<'de> + Ord, V: Deserialize<'de>"
))]
pub struct JoinMap<K, V>(BTreeMap<K, V>);

impl<K: Ord, V> JoinMap<K, V> {
    /// Empty map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Value under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.0.get(key)
    }

    /// Whether `key` has ever been inserted.
    pub fn contains_key(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.0.iter()
    }

    /// Keys in order.
    pub fn keys(&self) -> btree_map::Keys<'_, K, V> {
        self.0.keys()
    }
}

impl<K: Ord, V: JoinSemilattice> JoinMap<K, V> {
    /// Join `value` into the entry for `key`, inserting it if absent.
    ///
    /// Existing state is never overwritten, only joined with, so a merge
    /// cannot lose history.
    pub fn merge_entry(&mut self, key: K, value: V) {
        match self.0.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
            }
            btree_map::Entry::Occupied(mut slot) => {
                slot.get_mut().join_assign(&value);
            }
        }
    }
}

impl<K: Ord, V> Default for JoinMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: JoinSemilattice> JoinSemilattice for JoinMap<K, V> {
    fn join(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (key, value) in &other.0 {
            result.merge_entry(key.clone(), value.clone());
        }
        result
    }
}

impl<K: Ord, V> Bottom for JoinMap<K, V> {
    fn bottom() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: JoinSemilattice> CvState for JoinMap<K, V> {}

impl<K: Ord, V: JoinSemilattice> FromIterator<(K, V)> for JoinMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.merge_entry(key, value);
        }
        map
    }
}

impl<'a, K, V> IntoIterator for &'a JoinMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
